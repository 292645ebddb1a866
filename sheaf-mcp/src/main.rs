//! Sheaf MCP Server - batch file reads over workspace roots

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sheaf_core::{Config, ContentBlock, GatherRequest, Workspace};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let reader = BufReader::new(stdin.lock());

    let server = McpServer::new();
    tracing::info!("sheaf-mcp listening on stdio");

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        if line.is_empty() {
            continue;
        }

        let response = server.handle_request(&line);
        if let Some(resp) = response {
            let _ = writeln!(stdout, "{}", resp);
            let _ = stdout.flush();
        }
    }
}

struct McpServer;

#[derive(Deserialize)]
#[allow(dead_code)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

#[derive(Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl McpServer {
    fn new() -> Self {
        Self
    }

    fn handle_request(&self, line: &str) -> Option<String> {
        let req: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                return Some(
                    json!({
                        "jsonrpc": "2.0",
                        "id": null,
                        "error": { "code": -32700, "message": format!("Parse error: {}", e) }
                    })
                    .to_string(),
                );
            }
        };

        let id = req.id.clone().unwrap_or(Value::Null);

        let result = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req.params),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(&req.params),
            "notifications/initialized" => return None, // No response for notifications
            _ => Err((-32601, format!("Method not found: {}", req.method))),
        };

        let response = match result {
            Ok(value) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id,
                result: Some(value),
                error: None,
            },
            Err((code, message)) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id,
                result: None,
                error: Some(JsonRpcError { code, message }),
            },
        };

        Some(serde_json::to_string(&response).unwrap())
    }

    fn handle_initialize(&self, _params: &Option<Value>) -> Result<Value, (i32, String)> {
        Ok(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": "sheaf-mcp",
                "version": env!("CARGO_PKG_VERSION")
            }
        }))
    }

    fn handle_tools_list(&self) -> Result<Value, (i32, String)> {
        Ok(json!({
            "tools": [
                {
                    "name": "read_many_files",
                    "description": "Read and concatenate files matching path/glob patterns across workspace roots. Applies default excludes, .gitignore and .sheafignore rules, and a workspace security boundary; text content is truncated under line/byte budgets and images/PDFs are returned only when explicitly requested by name or extension.",
                    "inputSchema": {
                        "type": "object",
                        "properties": {
                            "roots": {
                                "type": "array",
                                "items": { "type": "string" },
                                "description": "Workspace root directories; the first is the display target"
                            },
                            "paths": {
                                "type": "array",
                                "items": { "type": "string" },
                                "description": "Path or glob patterns to gather (e.g., ['src/**/*.rs', 'README.md'])"
                            },
                            "include": {
                                "type": "array",
                                "items": { "type": "string" },
                                "description": "Additional include patterns"
                            },
                            "exclude": {
                                "type": "array",
                                "items": { "type": "string" },
                                "description": "Exclude patterns, unioned with the default excludes"
                            },
                            "useDefaultExcludes": {
                                "type": "boolean",
                                "description": "Apply the built-in default excludes (default: true)"
                            },
                            "respectGitIgnore": {
                                "type": "boolean",
                                "description": "Respect .gitignore rules (default: true)"
                            },
                            "respectSheafIgnore": {
                                "type": "boolean",
                                "description": "Respect .sheafignore rules (default: true)"
                            }
                        },
                        "required": ["roots", "paths"]
                    }
                }
            ]
        }))
    }

    fn handle_tools_call(&self, params: &Option<Value>) -> Result<Value, (i32, String)> {
        let params = params
            .as_ref()
            .ok_or((-32602, "Missing params".to_string()))?;

        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or((-32602, "Missing tool name".to_string()))?;

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        match name {
            "read_many_files" => self.tool_read_many_files(&arguments),
            _ => Err((-32602, format!("Unknown tool: {}", name))),
        }
    }

    fn tool_read_many_files(&self, args: &Value) -> Result<Value, (i32, String)> {
        let (roots, request) = parse_request(args)?;
        tracing::debug!(roots = roots.len(), patterns = request.patterns.len(), "read_many_files");

        let config = Config::load_or_default(&roots[0]).map_err(|e| (-32000, e.to_string()))?;
        let workspace = Workspace::new(roots, config).map_err(|e| (-32000, e.to_string()))?;
        let output = workspace
            .gather(&request)
            .map_err(|e| (-32000, e.to_string()))?;

        let mut text = output.combined_text();
        text.push_str("\n\n");
        text.push_str(&output.summary);

        let mut content = vec![json!({ "type": "text", "text": text })];
        for block in &output.blocks {
            if let ContentBlock::Binary {
                display,
                mime,
                data,
            } = block
            {
                content.push(binary_part(display, mime, data));
            }
        }

        Ok(json!({ "content": content }))
    }
}

/// Image payloads ride as MCP image parts; other binaries (PDF) as blob
/// resources.
fn binary_part(display: &str, mime: &str, data: &[u8]) -> Value {
    let encoded = BASE64.encode(data);
    if mime.starts_with("image/") {
        json!({ "type": "image", "data": encoded, "mimeType": mime })
    } else {
        json!({
            "type": "resource",
            "resource": {
                "uri": format!("sheaf://{}", display),
                "mimeType": mime,
                "blob": encoded
            }
        })
    }
}

/// Pull workspace roots and a GatherRequest out of tool-call arguments.
fn parse_request(args: &Value) -> Result<(Vec<PathBuf>, GatherRequest), (i32, String)> {
    let roots: Vec<PathBuf> = string_array(args, "roots")?
        .ok_or((-32602, "Missing required 'roots' parameter".to_string()))?
        .into_iter()
        .map(PathBuf::from)
        .collect();
    if roots.is_empty() {
        return Err((-32602, "'roots' must not be empty".to_string()));
    }

    let paths = string_array(args, "paths")?
        .ok_or((-32602, "Missing required 'paths' parameter".to_string()))?;
    if paths.is_empty() {
        return Err((-32602, "'paths' must not be empty".to_string()));
    }

    let request = GatherRequest {
        patterns: paths,
        include: string_array(args, "include")?.unwrap_or_default(),
        exclude: string_array(args, "exclude")?.unwrap_or_default(),
        use_default_excludes: bool_arg(args, "useDefaultExcludes", true),
        respect_git_ignore: bool_arg(args, "respectGitIgnore", true),
        respect_sheaf_ignore: bool_arg(args, "respectSheafIgnore", true),
    };

    Ok((roots, request))
}

fn string_array(args: &Value, key: &str) -> Result<Option<Vec<String>>, (i32, String)> {
    match args.get(key) {
        None => Ok(None),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str() {
                    Some(s) => out.push(s.to_string()),
                    None => {
                        return Err((
                            -32602,
                            format!("'{}' must be an array of strings", key),
                        ))
                    }
                }
            }
            Ok(Some(out))
        }
        Some(_) => Err((-32602, format!("'{}' must be an array of strings", key))),
    }
}

fn bool_arg(args: &Value, key: &str, default: bool) -> bool {
    args.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_request_defaults() {
        let args = json!({ "roots": ["/w"], "paths": ["**/*.rs"] });
        let (roots, request) = parse_request(&args).unwrap();
        assert_eq!(roots, vec![PathBuf::from("/w")]);
        assert_eq!(request.patterns, vec!["**/*.rs"]);
        assert!(request.use_default_excludes);
        assert!(request.respect_git_ignore);
        assert!(request.respect_sheaf_ignore);
    }

    #[test]
    fn test_parse_request_flags_and_extras() {
        let args = json!({
            "roots": ["/w"],
            "paths": ["a.md"],
            "include": ["*.txt"],
            "exclude": ["*.log"],
            "useDefaultExcludes": false,
            "respectGitIgnore": false,
            "respectSheafIgnore": false
        });
        let (_, request) = parse_request(&args).unwrap();
        assert_eq!(request.include, vec!["*.txt"]);
        assert_eq!(request.exclude, vec!["*.log"]);
        assert!(!request.use_default_excludes);
        assert!(!request.respect_git_ignore);
        assert!(!request.respect_sheaf_ignore);
    }

    #[test]
    fn test_parse_request_rejects_bad_shapes() {
        assert!(parse_request(&json!({ "paths": ["a"] })).is_err());
        assert!(parse_request(&json!({ "roots": ["/w"] })).is_err());
        assert!(parse_request(&json!({ "roots": [], "paths": ["a"] })).is_err());
        assert!(parse_request(&json!({ "roots": ["/w"], "paths": [1] })).is_err());
    }

    #[test]
    fn test_tools_list_exposes_read_many_files() {
        let server = McpServer::new();
        let tools = server.handle_tools_list().unwrap();
        let names: Vec<&str> = tools["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["read_many_files"]);
    }

    #[test]
    fn test_tool_call_end_to_end() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "hello\n").unwrap();

        let server = McpServer::new();
        let args = json!({
            "roots": [dir.path().to_string_lossy()],
            "paths": ["*.md"]
        });
        let result = server.tool_read_many_files(&args).unwrap();
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("--- a.md ---"));
        assert!(text.contains("hello"));
        assert!(text.contains("Processed 1 file(s)"));
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let server = McpServer::new();
        let response = server
            .handle_request(r#"{"jsonrpc":"2.0","id":1,"method":"nope"}"#)
            .unwrap();
        assert!(response.contains("-32601"));
    }

    #[test]
    fn test_notification_gets_no_response() {
        let server = McpServer::new();
        let response =
            server.handle_request(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#);
        assert!(response.is_none());
    }
}
