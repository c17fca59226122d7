use std::{
    fs,
    io::{Read, Write},
    net::{TcpListener, TcpStream},
    path::PathBuf,
};

use anyhow::Context;
use flock_lib::{flock::Flock, math_helpers::SimVector, snapshot};
use log::{debug, info, warn};

/// Page served on `GET /` when the configured index page can't be read.
const FALLBACK_PAGE: &str = include_str!("fallback.html");

/// Simple HTTP response builder
#[derive(Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    pub fn json(body: String) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.into_bytes(),
        }
    }

    pub fn html(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: "text/html",
            body,
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: message.as_bytes().to_vec(),
        }
    }
}

/// Simple HTTP request parser, only the request line is of interest
#[derive(Debug, PartialEq)]
pub struct HttpRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
}

impl<'a> HttpRequest<'a> {
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        let request_str = std::str::from_utf8(data).ok()?;
        let request_line = request_str.lines().next()?;

        let mut parts = request_line.split(' ');
        let method = parts.next().filter(|m| !m.is_empty())?;
        let path = parts.next().filter(|p| !p.is_empty())?;

        Some(HttpRequest { method, path })
    }
}

/// Status line, headers and body, ready for the wire.
pub fn format_response(response: &Response) -> Vec<u8> {
    let status_text = match response.status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    };

    let header = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nAccess-Control-Allow-Origin: *\r\nContent-Length: {}\r\n\r\n",
        response.status,
        status_text,
        response.content_type,
        response.body.len()
    );

    let mut out = header.into_bytes();
    out.extend_from_slice(&response.body);
    out
}

/// Owns the flock and advances it by `dt` on every `GET /api/boids`.
pub struct BoidServer<V> {
    flock: Flock<V>,
    dt: f32,
    index_path: PathBuf,
}

impl<V: SimVector> BoidServer<V> {
    pub fn new(flock: Flock<V>, dt: f32, index_path: PathBuf) -> Self {
        BoidServer {
            flock,
            dt,
            index_path,
        }
    }

    pub fn handle(&mut self, request: &HttpRequest) -> Response {
        // query strings (cache busting) don't change the route
        let route = request.path.split('?').next().unwrap_or(request.path);

        match (request.method, route) {
            ("GET", "/api/boids") => {
                self.flock.update(self.dt);
                match snapshot::to_json(&self.flock.snapshot()) {
                    Ok(json) => Response::json(json),
                    Err(e) => {
                        warn!("Serialization failed: {}", e);
                        Response::error(500, "Internal Server Error")
                    }
                }
            }
            ("GET", _) => Response::html(self.index_page()),
            _ => Response::error(404, "404 Not Found"),
        }
    }

    fn index_page(&self) -> Vec<u8> {
        match fs::read(&self.index_path) {
            Ok(page) if !page.is_empty() => page,
            Ok(_) => FALLBACK_PAGE.as_bytes().to_vec(),
            Err(e) => {
                debug!("{} not served: {}", self.index_path.display(), e);
                FALLBACK_PAGE.as_bytes().to_vec()
            }
        }
    }

    /// Serves one connection at a time, forever. Only failing to bind is
    /// fatal.
    pub fn serve(mut self, bind: &str) -> anyhow::Result<()> {
        let listener =
            TcpListener::bind(bind).with_context(|| format!("Failed to bind {}", bind))?;

        info!("Boids server running on http://{}", bind);

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Err(e) = self.handle_client(stream) {
                        warn!("Error handling client: {:?}", e);
                    }
                }
                Err(e) => {
                    warn!("Connection error: {:?}", e);
                }
            }
        }

        Ok(())
    }

    fn handle_client(&mut self, mut stream: TcpStream) -> anyhow::Result<()> {
        let mut buffer = [0u8; 1024];
        let bytes_read = stream.read(&mut buffer)?;

        if bytes_read == 0 {
            return Ok(());
        }

        let response = match HttpRequest::parse(&buffer[..bytes_read]) {
            Some(request) => {
                debug!("Request: {} {}", request.method, request.path);
                self.handle(&request)
            }
            None => Response::error(400, "400 Bad Request"),
        };

        stream.write_all(&format_response(&response))?;
        stream.flush()?;

        // dropping the stream closes the connection
        Ok(())
    }
}
