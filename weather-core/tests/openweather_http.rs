use std::{io::Cursor, sync::Arc};

use image::{ImageFormat, Rgba, RgbaImage};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};
use weather_core::{
    Applied, ClientConfig, IconPlan, IconSize, OpenWeatherProvider, Renderer, Shell, UnitSystem,
    WeatherError, WeatherProvider, WeatherSnapshot,
};

const CURRENT_BODY: &str = r#"{
    "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
    "main": {"temp": 21.5, "pressure": 1019, "humidity": 40},
    "wind": {"speed": 3.1},
    "sys": {"country": "JP"},
    "name": "Tokyo"
}"#;

const FORECAST_BODY: &str = r#"{
    "list": [
        {"dt_txt": "2024-01-01 00:00:00", "main": {"temp": 3, "temp_min": 1, "temp_max": 5},
         "weather": [{"description": "clear sky", "icon": "01n"}], "wind": {"speed": 1.2}},
        {"dt_txt": "2024-01-01 03:00:00", "main": {"temp": 4, "temp_min": -2, "temp_max": 9},
         "weather": [{"description": "few clouds", "icon": "02n"}], "wind": {"speed": 1.4}},
        {"dt_txt": "2024-01-02 00:00:00", "main": {"temp": 5, "temp_min": 3, "temp_max": 6},
         "weather": [{"description": "snow", "icon": "13n"}], "wind": {"speed": 2.0}}
    ]
}"#;

/// Serve exactly one HTTP response, returning the base URL and the raw request.
async fn serve_once(
    status: &'static str,
    content_type: &'static str,
    body: Vec<u8>,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request: Vec<u8> = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let head = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        socket.shutdown().await.ok();

        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{addr}"), handle)
}

fn provider(base: &str) -> OpenWeatherProvider {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    OpenWeatherProvider::with_client(ClientConfig::new("TEST_KEY").with_base(base), http)
}

fn request_line(request: &str) -> &str {
    request.lines().next().unwrap_or_default()
}

fn png(side: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(side, side, Rgba([30, 144, 255, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

#[tokio::test]
async fn fetch_current_sends_query_and_parses_body() {
    let (base, server) = serve_once("200 OK", "application/json", CURRENT_BODY.into()).await;

    let current = provider(&base).fetch_current("Tokyo", UnitSystem::Imperial).await.unwrap();

    assert_eq!(current.city, "Tokyo");
    assert_eq!(current.country, "JP");
    assert_eq!(current.icon, "01d");
    assert_eq!(current.pressure, 1019.0);

    let request = server.await.unwrap();
    let line = request_line(&request);
    assert!(line.starts_with("GET /weather?"), "{line}");
    assert!(line.contains("q=Tokyo"));
    assert!(line.contains("appid=TEST_KEY"));
    assert!(line.contains("units=imperial"));
}

#[tokio::test]
async fn city_names_are_url_encoded() {
    let (base, server) = serve_once("200 OK", "application/json", CURRENT_BODY.into()).await;

    provider(&base).fetch_current("São Paulo", UnitSystem::Metric).await.unwrap();

    let request = server.await.unwrap();
    let line = request_line(&request);
    assert!(line.contains("q=S%C3%A3o+Paulo"), "{line}");
    assert!(line.contains("units=metric"));
}

#[tokio::test]
async fn fetch_forecast_normalizes_intervals() {
    let (base, server) = serve_once("200 OK", "application/json", FORECAST_BODY.into()).await;

    let forecast = provider(&base).fetch_forecast("Tokyo", UnitSystem::Metric).await.unwrap();

    assert_eq!(forecast.hourly.len(), 3);
    assert_eq!(forecast.daily.len(), 2);
    assert_eq!((forecast.daily[0].min_temp, forecast.daily[0].max_temp), (-2.0, 9.0));
    assert_eq!(forecast.daily[0].icon, "01n");
    assert_eq!((forecast.daily[1].min_temp, forecast.daily[1].max_temp), (3.0, 6.0));

    let request = server.await.unwrap();
    assert!(request_line(&request).starts_with("GET /forecast?"));
}

#[tokio::test]
async fn non_success_status_is_an_http_status_error() {
    let body = br#"{"cod":"404","message":"city not found"}"#.to_vec();
    let (base, _server) = serve_once("404 Not Found", "application/json", body).await;

    let err = provider(&base).fetch_current("Nowhere", UnitSystem::Metric).await.unwrap_err();

    match &err {
        WeatherError::HttpStatus { status, body, .. } => {
            assert_eq!(status.as_u16(), 404);
            assert!(body.contains("city not found"));
        }
        other => panic!("expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = provider(&base).fetch_forecast("Tokyo", UnitSystem::Metric).await.unwrap_err();
    assert!(matches!(err, WeatherError::Network { what: "forecast", .. }), "{err}");
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let body = CURRENT_BODY.replace(r#", "icon": "01d""#, "");
    let (base, _server) = serve_once("200 OK", "application/json", body.into_bytes()).await;

    let err = provider(&base).fetch_current("Tokyo", UnitSystem::Metric).await.unwrap_err();
    assert!(matches!(err, WeatherError::Parse { .. }), "{err}");
}

#[tokio::test]
async fn fetch_icon_decodes_and_resizes() {
    let (base, server) = serve_once("200 OK", "image/png", png(100)).await;

    let bitmap = provider(&base).fetch_icon("10d", IconSize::square(48)).await.unwrap();
    assert_eq!((bitmap.width(), bitmap.height()), (48, 48));

    let request = server.await.unwrap();
    assert!(request_line(&request).starts_with("GET /img/wn/10d@2x.png "));
}

#[tokio::test]
async fn fetch_icon_rejects_non_png_payload() {
    let (base, _server) = serve_once("200 OK", "text/html", b"<html></html>".to_vec()).await;

    let err = provider(&base).fetch_icon("10d", IconSize::HOURLY).await.unwrap_err();
    assert!(matches!(err, WeatherError::Decode { .. }), "{err}");
}

#[derive(Default)]
struct Collect {
    rendered: Vec<WeatherSnapshot>,
    errors: Vec<String>,
}

impl Renderer for Collect {
    fn render(&mut self, snapshot: &WeatherSnapshot) {
        self.rendered.push(snapshot.clone());
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

#[tokio::test]
async fn shell_reports_provider_errors_as_messages() {
    let (base, _server) = serve_once("401 Unauthorized", "application/json", b"{}".to_vec()).await;

    let mut shell =
        Shell::new(Arc::new(provider(&base)), Collect::default()).with_icons(IconPlan::NONE);
    let id = shell.submit("Tokyo", UnitSystem::Metric).unwrap();

    assert_eq!(shell.apply_next().await, Some(Applied::Failed(id)));
    let collect = shell.renderer();
    assert!(collect.rendered.is_empty());
    assert_eq!(
        collect.errors,
        ["current weather request failed with status 401 Unauthorized: {}"]
    );
}
