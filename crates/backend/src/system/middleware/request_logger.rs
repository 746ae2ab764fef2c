use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{DateTime, Duration, Utc};

use crate::shared::format::format_number;

/// Argentina (UTC-3)
const LOCAL_OFFSET_HOURS: i64 = -3;

fn render_line(
    at: DateTime<Utc>,
    elapsed_ms: u128,
    size: Option<usize>,
    status: StatusCode,
    method: &Method,
    path: &str,
) -> String {
    // голубой для 200, коричневый для остальных
    let color = if status == StatusCode::OK { "36" } else { "33" };
    let local = at + Duration::hours(LOCAL_OFFSET_HOURS);
    let size = size.map(format_number).unwrap_or_else(|| "error".to_string());
    format!(
        "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
        color,
        local.format("%H:%M:%S"),
        elapsed_ms,
        size,
        status.as_u16(),
        method,
        path
    )
}

/// Middleware для логирования HTTP запросов: время, длительность,
/// размер ответа, статус, метод и путь
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Тело читается целиком, чтобы узнать реальный размер
    let bytes = to_bytes(body, usize::MAX).await.ok();
    println!(
        "{}",
        render_line(
            Utc::now(),
            start.elapsed().as_millis(),
            bytes.as_ref().map(|b| b.len()),
            parts.status,
            &method,
            &path,
        )
    );

    match bytes {
        Some(bytes) => Response::from_parts(parts, Body::from(bytes)),
        None => Response::from_parts(parts, Body::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn line_uses_local_time_and_grouped_size() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 15, 4, 5).unwrap();
        let line = render_line(at, 12, Some(1_234_567), StatusCode::OK, &Method::GET, "/api/cierres");
        assert!(line.contains("12:04:05"));
        assert!(line.contains("1.234.567"));
        assert!(line.ends_with("GET /api/cierres"));
        assert!(line.starts_with("\x1b[36m"));
    }

    #[test]
    fn unreadable_body_is_reported_as_error() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 2, 0, 0).unwrap();
        let line = render_line(at, 0, None, StatusCode::NOT_FOUND, &Method::POST, "/x");
        assert!(line.contains("23:00:00"));
        assert!(line.contains("error"));
        assert!(line.starts_with("\x1b[33m"));
    }
}
