use trevi::http::names::CONTENT_LENGTH;
use trevi::http::{HeaderInfo, ParseError};

fn info(method: &str, url: &str, minor: &str, headers: &[(&str, &str)]) -> HeaderInfo {
    let mut info = HeaderInfo::new();
    info.method = Some(method.to_string());
    info.url = Some(url.to_string());
    info.version_major = Some("1".to_string());
    info.version_minor = Some(minor.to_string());
    for (k, v) in headers {
        info.headers.insert(k.to_string(), v.to_string());
    }
    info
}

#[test]
fn test_unset_fields_before_request_line() {
    let info = HeaderInfo::new();

    assert_eq!(info.method, None);
    assert_eq!(info.url, None);
    assert!(info.headers.is_empty());
    assert!(!info.has_body);
    assert_eq!(info.request_target(), None);
}

#[test]
fn test_content_length() {
    assert_eq!(info("GET", "/", "1", &[]).content_length(), Ok(0));
    assert_eq!(
        info("POST", "/", "1", &[("Content-Length", "42")]).content_length(),
        Ok(42)
    );
    assert_eq!(
        info("POST", "/", "1", &[("Content-Length", "-1")]).content_length(),
        Err(ParseError::InvalidContentLength("-1".to_string()))
    );
}

#[test]
fn test_content_length_requires_plain_digits() {
    for value in ["+3", "", " ", "0x10", "1_000"] {
        assert_eq!(
            info("POST", "/", "1", &[(CONTENT_LENGTH, value)]).content_length(),
            Err(ParseError::InvalidContentLength(value.to_string())),
            "accepted {value:?}"
        );
    }
    assert_eq!(
        info("POST", "/", "1", &[(CONTENT_LENGTH, "007")]).content_length(),
        Ok(7)
    );
}

#[test]
fn test_keep_alive_defaults() {
    assert!(info("GET", "/", "1", &[]).keep_alive());
    assert!(!info("GET", "/", "1", &[("Connection", "close")]).keep_alive());
    assert!(!info("GET", "/", "0", &[]).keep_alive());
    assert!(info("GET", "/", "0", &[("Connection", "Keep-Alive")]).keep_alive());
}

#[test]
fn test_request_target_origin_form() {
    let info = info("GET", "/search?q=rust", "1", &[("Host", "example.com:8080")]);
    let url = info.request_target().unwrap();

    assert_eq!(url.host_str(), Some("example.com"));
    assert_eq!(url.port(), Some(8080));
    assert_eq!(url.path(), "/search");
    assert_eq!(url.query(), Some("q=rust"));
}

#[test]
fn test_request_target_absolute_form() {
    let info = info("GET", "http://proxy.test/a/b", "1", &[("Host", "ignored")]);

    assert_eq!(info.request_target().unwrap().as_str(), "http://proxy.test/a/b");
}
