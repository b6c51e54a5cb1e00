//! Declarations for the three tools offered to the model on every turn.

use serde_json::json;

use parley_types::tool::{FunctionDeclaration, ToolDeclaration, ToolName};

fn declaration(name: ToolName, description: &str, parameters: serde_json::Value) -> ToolDeclaration {
    ToolDeclaration {
        kind: "function".to_string(),
        function: FunctionDeclaration {
            name: name.as_str().to_string(),
            description: description.to_string(),
            parameters,
        },
    }
}

/// `ask_user`, `read_file`, and `run_shell_command`, in that order.
pub fn tool_declarations() -> Vec<ToolDeclaration> {
    vec![
        declaration(
            ToolName::AskUser,
            "Ask the user a question and get their response",
            json!({
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "The question to ask the user"
                    }
                },
                "required": ["question"]
            }),
        ),
        declaration(
            ToolName::ReadFile,
            "Read the contents of a file. Supports reading entire files (up to 100KB, larger \
             files are truncated) or specific line ranges for efficiency.",
            json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Path to the file to read"
                    },
                    "start_line": {
                        "type": "integer",
                        "description": "Optional: Start line number (1-based) for reading a specific range"
                    },
                    "end_line": {
                        "type": "integer",
                        "description": "Optional: End line number (1-based) for reading a specific range"
                    }
                },
                "required": ["file_path"]
            }),
        ),
        declaration(
            ToolName::RunShellCommand,
            "Execute a shell command",
            json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "The shell command to execute"
                    }
                },
                "required": ["command"]
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declares_three_function_tools() {
        let tools = tool_declarations();
        let names: Vec<&str> = tools.iter().map(|t| t.function.name.as_str()).collect();
        assert_eq!(names, vec!["ask_user", "read_file", "run_shell_command"]);
        assert!(tools.iter().all(|t| t.kind == "function"));
    }

    #[test]
    fn required_lists_match_mandatory_arguments() {
        let tools = tool_declarations();
        let required: Vec<serde_json::Value> = tools
            .iter()
            .map(|t| t.function.parameters["required"].clone())
            .collect();
        assert_eq!(
            required,
            vec![json!(["question"]), json!(["file_path"]), json!(["command"])]
        );
    }
}
