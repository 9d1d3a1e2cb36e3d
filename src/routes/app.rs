pub async fn hello() -> &'static str {
    "Hello World!"
}

/// Probe route gated on login plus the `ccc` permission.
pub async fn aaa() -> &'static str {
    "aaa"
}

pub async fn bbb() -> &'static str {
    "bbb"
}
