use std::str::FromStr;

use crate::error::AppError;

const DEFAULT_PAGE_SIZE: i64 = 10;

/// Parse an optional numeric query parameter, naming it in the error.
pub fn parse_int<T: FromStr>(name: &str, value: Option<&str>) -> Result<Option<T>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{name} must be a number"))),
    }
}

pub fn require_int<T: FromStr>(name: &str, value: Option<&str>) -> Result<T, AppError> {
    parse_int(name, value)?.ok_or_else(|| AppError::BadRequest(format!("{name} is required")))
}

/// Treat blank filters as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub no: i64,
    pub size: i64,
}

impl Page {
    /// `pageNo` defaults to 1 and `pageSize` to 10; both must be at least 1.
    pub fn parse(page_no: Option<&str>, page_size: Option<&str>) -> Result<Self, AppError> {
        let no = parse_int("pageNo", page_no)?.unwrap_or(1);
        let size = parse_int("pageSize", page_size)?.unwrap_or(DEFAULT_PAGE_SIZE);

        if no < 1 {
            return Err(AppError::BadRequest("pageNo must be at least 1".to_string()));
        }
        if size < 1 {
            return Err(AppError::BadRequest("pageSize must be at least 1".to_string()));
        }
        Ok(Page { no, size })
    }

    pub fn offset(&self) -> i64 {
        (self.no - 1) * self.size
    }
}
