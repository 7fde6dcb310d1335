//! In-process fake backend for tests.

use std::time::Duration;

use async_trait::async_trait;
use axum::extract::Multipart;
use axum::Router;

use crate::config::ClientConfig;
use crate::preview::{DocumentRenderer, RenderOutcome, RenderRequest};

/// Serve `router` on an ephemeral localhost port and return a config
/// pointing at it.
pub async fn serve(router: Router) -> ClientConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("fake backend address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    ClientConfig::new(&format!("http://{addr}/")).expect("fake backend url")
}

/// One part of a received multipart form.
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl FormField {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).to_string()
    }
}

/// Drain a multipart request into memory.
pub async fn read_form(mut multipart: Multipart) -> Vec<FormField> {
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        fields.push(FormField {
            name,
            file_name,
            content_type,
            data,
        });
    }
    fields
}

/// Value of the first text field called `name`.
pub fn field_text(fields: &[FormField], name: &str) -> Option<String> {
    fields.iter().find(|f| f.name == name).map(FormField::text)
}

/// Renderer for fake documents whose content describes the outcome:
/// `pages=N`, `locked=PASSWORD`, `delay=MS`, `corrupt` and `crash`, space
/// separated. `crash` panics inside the renderer.
pub struct FakeRenderer;

#[async_trait]
impl DocumentRenderer for FakeRenderer {
    async fn render(&self, request: RenderRequest) -> RenderOutcome {
        let script = String::from_utf8_lossy(&request.document).to_string();
        let mut pages = 1;
        let mut lock = None;
        for token in script.split_whitespace() {
            match token.split_once('=') {
                Some(("pages", n)) => pages = n.parse().unwrap_or(1),
                Some(("locked", pw)) => lock = Some(pw.to_string()),
                Some(("delay", ms)) => {
                    tokio::time::sleep(Duration::from_millis(ms.parse().unwrap_or(0))).await;
                }
                _ if token == "crash" => panic!("renderer crashed"),
                _ if token == "corrupt" => {
                    return RenderOutcome::Failed {
                        reason: "invalid PDF structure".to_string(),
                    }
                }
                _ => {}
            }
        }

        match lock {
            Some(pw) if request.password.as_deref() != Some(pw.as_str()) => {
                RenderOutcome::PasswordRequired
            }
            _ => RenderOutcome::Loaded { page_count: pages },
        }
    }
}
