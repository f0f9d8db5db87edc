//! Builtin actions shipped with the engine.
//!
//! These are registry-only handlers (no on-disk package) living under the
//! `_builtin/` prefix. Each carries an inline manifest and goes through the
//! same validation and capability injection as any packaged action — a
//! builtin that writes files declares `writeFile` and receives that handle
//! and nothing else.

use std::sync::Arc;

use async_trait::async_trait;
use pai_types::{ActionManifest, CapabilityName, SchemaDoc};
use serde_json::{json, Value};

use crate::context::ActionContext;
use crate::registry::{ActionHandler, HandlerRegistry};

/// Register all builtin actions into the registry's builtin layer.
pub fn register_builtins(registry: &mut HandlerRegistry) {
    registry.register_builtin("_builtin/write-file", Arc::new(WriteFileAction));
    registry.register_builtin("_builtin/open-url", Arc::new(OpenUrlAction));
    registry.register_builtin("_builtin/preview-markdown", Arc::new(PreviewMarkdownAction));
}

/// Platform command that opens a path or URL with the default application.
#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const OPENER: &str = "xdg-open";

/// Single-quote a string for safe interpolation into a shell command.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

fn inline_manifest(
    name: &str,
    description: &str,
    input: Value,
    requires: Vec<CapabilityName>,
) -> ActionManifest {
    let mut manifest = ActionManifest::implicit(name);
    manifest.version = "1.0.0".to_string();
    manifest.description = description.to_string();
    manifest.input = SchemaDoc::from_value(input).ok();
    manifest.requires = requires;
    manifest
}

/// `_builtin/write-file` — write text content to a path.
struct WriteFileAction;

#[async_trait]
impl ActionHandler for WriteFileAction {
    fn manifest(&self) -> Option<ActionManifest> {
        Some(inline_manifest(
            "_builtin/write-file",
            "Write text content to a file path",
            json!({
                "path": { "type": "string", "required": true },
                "content": { "type": "string", "required": true }
            }),
            vec![CapabilityName::WriteFile],
        ))
    }

    async fn execute(&self, input: Value, ctx: &ActionContext) -> anyhow::Result<Value> {
        let path = input["path"].as_str().unwrap_or_default().to_string();
        let content = input["content"].as_str().unwrap_or_default();

        let write_file = ctx
            .capabilities
            .write_file
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("writeFile capability not granted"))?;
        write_file.write(&path, content).await?;

        Ok(json!({ "path": path, "written": true }))
    }
}

/// `_builtin/open-url` — open a URL with the platform opener.
struct OpenUrlAction;

#[async_trait]
impl ActionHandler for OpenUrlAction {
    fn manifest(&self) -> Option<ActionManifest> {
        Some(inline_manifest(
            "_builtin/open-url",
            "Open a URL in the default browser",
            json!({
                "url": { "type": "string", "required": true }
            }),
            vec![CapabilityName::Shell],
        ))
    }

    async fn execute(&self, input: Value, ctx: &ActionContext) -> anyhow::Result<Value> {
        let url = input["url"].as_str().unwrap_or_default().to_string();

        let shell = ctx
            .capabilities
            .shell
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("shell capability not granted"))?;
        let result = shell.run(&format!("{OPENER} {}", shell_quote(&url))).await;
        if result.code != 0 {
            anyhow::bail!("failed to open url: {}", result.stderr.trim());
        }

        Ok(json!({ "opened": url }))
    }
}

/// `_builtin/preview-markdown` — render markdown to a temp HTML file and
/// open it in the browser.
struct PreviewMarkdownAction;

#[async_trait]
impl ActionHandler for PreviewMarkdownAction {
    fn manifest(&self) -> Option<ActionManifest> {
        Some(inline_manifest(
            "_builtin/preview-markdown",
            "Render markdown content to a temporary HTML preview",
            json!({
                "content": { "type": "string", "required": true },
                "title": { "type": "string", "required": false }
            }),
            vec![CapabilityName::WriteFile, CapabilityName::Shell],
        ))
    }

    async fn execute(&self, input: Value, ctx: &ActionContext) -> anyhow::Result<Value> {
        let content = input["content"].as_str().unwrap_or_default();
        let title = input["title"].as_str().unwrap_or("Preview");

        let html_path = std::env::temp_dir().join(format!("pai-preview-{}.html", uuid::Uuid::new_v4()));
        let html_path_str = html_path.display().to_string();
        let html = render_preview_html(title, content);

        let write_file = ctx
            .capabilities
            .write_file
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("writeFile capability not granted"))?;
        write_file.write(&html_path_str, &html).await?;

        let shell = ctx
            .capabilities
            .shell
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("shell capability not granted"))?;
        shell
            .run(&format!("{OPENER} {}", shell_quote(&html_path_str)))
            .await;

        Ok(json!({
            "url": format!("file://{html_path_str}"),
            "path": html_path_str,
        }))
    }
}

fn render_preview_html(title: &str, markdown: &str) -> String {
    let content_json = serde_json::to_string(markdown).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="UTF-8">
  <title>{title}</title>
  <script src="https://cdn.jsdelivr.net/npm/marked/marked.min.js"></script>
  <style>
    body {{ max-width: 800px; margin: 40px auto; padding: 20px; font-family: sans-serif; line-height: 1.6; }}
    pre {{ background: #f4f4f4; padding: 16px; overflow-x: auto; }}
    code {{ background: #f4f4f4; padding: 2px 6px; }}
  </style>
</head>
<body>
  <div id="content"></div>
  <script>document.getElementById('content').innerHTML = marked.parse({content_json});</script>
</body>
</html>"#
    )
}
