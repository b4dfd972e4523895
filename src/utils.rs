/// Path and protocol helper functions / 路径与协议工具函数

use chrono::{DateTime, Utc};
use std::path::Path;

/// Default object key for an upload: the final segment of the local path
/// 上传的默认对象键：本地路径的最后一段
///
/// Both `/` and `\` are treated as separators so Windows style paths resolve the same way.
pub fn object_key_from_path(path: &str) -> Option<String> {
    let normalized = path.replace('\\', "/");
    Path::new(&normalized)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(|n| n.to_string())
}

/// Build the endpoint URL from a host:port string and the TLS flag / 构建端点URL
///
/// An endpoint that already carries a scheme is returned unchanged (minus trailing `/`).
pub fn endpoint_url(endpoint: &str, secure: bool) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    let lower = endpoint.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return endpoint.to_string();
    }
    let scheme = if secure { "https" } else { "http" };
    format!("{}://{}", scheme, endpoint)
}

/// Parse an HTTP date (RFC 2822 / IMF-fixdate), falling back to RFC 3339 / 解析HTTP日期
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .or_else(|_| DateTime::parse_from_rfc3339(value.trim()))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Check if an HTTP status code is a success (2xx) / 判断状态码是否成功
pub fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}

/// Guess the content type from the file extension / 根据扩展名推断内容类型
pub fn guess_content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_from_path() {
        assert_eq!(
            object_key_from_path("./Grupo 10/Documento_grupo_10.pdf").as_deref(),
            Some("Documento_grupo_10.pdf")
        );
        assert_eq!(object_key_from_path("doc.pdf").as_deref(), Some("doc.pdf"));
        assert_eq!(object_key_from_path("/tmp/a/b.txt").as_deref(), Some("b.txt"));
        assert_eq!(object_key_from_path("C:\\data\\report.csv").as_deref(), Some("report.csv"));
        assert_eq!(object_key_from_path("/"), None);
        assert_eq!(object_key_from_path(".."), None);
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(endpoint_url("localhost:9000", false), "http://localhost:9000");
        assert_eq!(endpoint_url("localhost:9000", true), "https://localhost:9000");
        assert_eq!(endpoint_url("https://minio.example.com/", false), "https://minio.example.com");
        assert_eq!(endpoint_url(" play.min.io ", true), "https://play.min.io");
    }

    #[test]
    fn test_parse_http_date() {
        let dt = parse_http_date("Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
        assert_eq!(dt.to_rfc3339(), "2015-10-21T07:28:00+00:00");
        let dt = parse_http_date("2024-01-02T03:04:05.000Z").unwrap();
        assert_eq!(dt.timestamp(), 1704164645);
        assert!(parse_http_date("yesterday").is_none());
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("a.pdf")), "application/pdf");
        assert_eq!(guess_content_type(Path::new("noext")), "application/octet-stream");
    }
}
