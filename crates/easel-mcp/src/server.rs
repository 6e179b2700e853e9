//! The Easel MCP server and its tool catalog.

use crate::report::format_task_report;
use crate::result::{parse_task_report, render_response};
use easel_bridge::{ExecuteOptions, PanelBridge};
use easel_executor::support::presets::GridPreset;
use easel_scripts::{templates, LibraryResolver};
use easel_types::{CommandMetadata, Target, TargetSelector, TaskPayload};
use rmcp::{
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData, ServerHandler,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

const INSTRUCTIONS: &str = "\
Bridge to Adobe Illustrator. execute_script is the primary tool; the \
Task Protocol tools (execute_task, query_items, arrange_grid, \
fit_to_template) add declarative targeting and structured reports.\n\
\n\
Coordinate system: origin at the artboard top-left, units are points \
(1pt = 1/72in), and the Y axis is NEGATIVE downward; use -y when \
positioning objects.";

/// The MCP server: thin glue between validated tool arguments and
/// single broker calls.
#[derive(Clone)]
pub struct EaselServer {
    bridge: Arc<PanelBridge>,
    resolver: Arc<LibraryResolver>,
    tool_router: rmcp::handler::server::tool::ToolRouter<Self>,
}

#[tool_handler]
impl ServerHandler for EaselServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

// === Tool inputs ===

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct ExecuteScriptInput {
    #[schemars(description = "ExtendScript code to execute in Illustrator")]
    pub script: String,
    #[serde(default)]
    #[schemars(description = "Short description shown in the panel log")]
    pub description: Option<String>,
    #[serde(default)]
    #[schemars(
        description = "Standard libraries to inject (geometry, selection, layout, presets, assets, task_executor)"
    )]
    pub includes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct ExecuteTaskInput {
    #[schemars(description = "Task Protocol payload: task, version, targets, params, options")]
    pub payload: Value,
    #[serde(default)]
    #[schemars(description = "Collector function name (default: collectTargets)")]
    pub collect_fn: Option<String>,
    #[schemars(
        description = "JSX body for the compute stage. Receives (items, params, report); returns an actions array; must not mutate the document."
    )]
    pub compute_fn: String,
    #[schemars(
        description = "JSX body for the apply stage. Receives (actions, report); the only stage allowed to mutate the document."
    )]
    pub apply_fn: String,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct QueryItemsInput {
    #[serde(default)]
    #[schemars(description = "Exact typename filter (PathItem, TextFrame, GroupItem, ...)")]
    pub item_type: Option<String>,
    #[serde(default)]
    #[schemars(description = "Name pattern; * matches any run, ? one character")]
    pub pattern: Option<String>,
    #[serde(default)]
    #[schemars(description = "Restrict to one layer")]
    pub layer: Option<String>,
    #[serde(default)]
    #[schemars(description = "Descend into groups")]
    pub recursive: bool,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct ArrangeGridInput {
    #[schemars(description = "Items per row")]
    pub columns: usize,
    #[serde(default)]
    #[schemars(description = "Horizontal gap between items, points")]
    pub gap_x: f64,
    #[serde(default)]
    #[schemars(description = "Vertical gap between rows, points")]
    pub gap_y: f64,
    #[serde(default)]
    #[schemars(description = "Grid origin X, points")]
    pub origin_x: f64,
    #[serde(default)]
    #[schemars(description = "Grid origin Y, points (host Y grows upward)")]
    pub origin_y: f64,
    #[serde(default)]
    #[schemars(description = "Layer to arrange; defaults to the current selection")]
    pub layer: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct FitToTemplateInput {
    #[schemars(description = "Grid preset: 2x2, 3x1, 1x3, 2x3, 3x2, 1x2, or 2x1")]
    pub preset: String,
    #[serde(default)]
    #[schemars(description = "Fit mode: contain (default), cover, or stretch")]
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct AlignObjectsInput {
    #[schemars(description = "Edge or axis to align on")]
    pub alignment: Alignment,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DistributeDirection {
    Horizontal,
    Vertical,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct DistributeObjectsInput {
    #[schemars(description = "Distribution direction")]
    pub direction: DistributeDirection,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct CreateDocumentInput {
    #[schemars(description = "Width in points")]
    pub width: f64,
    #[schemars(description = "Height in points")]
    pub height: f64,
    #[serde(default)]
    #[schemars(description = "RGB (default) or CMYK")]
    pub color_mode: Option<String>,
    #[serde(default)]
    #[schemars(description = "Document title")]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct ExportDocumentInput {
    #[schemars(description = "Absolute output path")]
    pub path: String,
    #[serde(default)]
    #[schemars(description = "png (default), jpg, or svg")]
    pub format: Option<String>,
    #[serde(default)]
    #[schemars(description = "Raster scale factor (default 1.0)")]
    pub scale: Option<f64>,
}

#[tool_router]
impl EaselServer {
    /// Creates a server over a running bridge and a library resolver.
    pub fn new(bridge: Arc<PanelBridge>, resolver: Arc<LibraryResolver>) -> Self {
        Self {
            bridge,
            resolver,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Execute raw ExtendScript in Illustrator. The primary tool; request standard libraries via `includes`."
    )]
    async fn execute_script(
        &self,
        Parameters(args): Parameters<ExecuteScriptInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let includes = args.includes.unwrap_or_default();
        let script = match self.resolver.compose(&args.script, &includes) {
            Ok(script) => script,
            Err(err) => return Ok(tool_error(format!("Error importing libraries: {err}"))),
        };

        let label = match &args.description {
            Some(desc) if !desc.trim().is_empty() => desc.trim().chars().take(50).collect(),
            _ => script_preview(&args.script),
        };
        let command = CommandMetadata {
            command_type: label,
            tool: "execute_script".into(),
            params: json!({"length": args.script.len(), "includes": includes}),
            trace_id: None,
        };

        self.run_script(script, command).await
    }

    #[tool(
        description = "Execute a structured Task Protocol payload: declarative targets, standardized report with timing and per-item errors, dryRun and trace support."
    )]
    async fn execute_task(
        &self,
        Parameters(args): Parameters<ExecuteTaskInput>,
    ) -> Result<CallToolResult, ErrorData> {
        // Validate the payload shape before shipping anything.
        let payload: TaskPayload = match serde_json::from_value(args.payload.clone()) {
            Ok(payload) => payload,
            Err(err) => return Ok(tool_error(format!("Invalid task payload: {err}"))),
        };
        if !payload.version_supported() {
            return Ok(tool_error(format!(
                "Invalid task payload: unsupported protocol version {:?}",
                payload.version.as_deref().unwrap_or_default()
            )));
        }

        let task = payload.task.clone();
        let collect_fn = args.collect_fn.as_deref().unwrap_or("collectTargets");
        let payload_json = serde_json::to_string(&payload)
            .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
        let body = format!(
            r#"function compute(items, params, report) {{
{compute}
}}

function apply(actions, report) {{
{apply}
}}

var payload = {payload_json};
var report = executeTask(payload, {collect_fn}, compute, apply);
JSON.stringify(report);"#,
            compute = args.compute_fn,
            apply = args.apply_fn,
        );

        self.run_task(&task, body, json!({"task": task})).await
    }

    #[tool(
        description = "List items matching a query (type, name pattern, layer) as stable references: locator, identity, tags."
    )]
    async fn query_items(
        &self,
        Parameters(args): Parameters<QueryItemsInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let target = if args.item_type.is_none() && args.pattern.is_none() && args.layer.is_none() {
            Target::All {
                recursive: args.recursive,
            }
        } else {
            Target::Query {
                item_type: args.item_type.clone(),
                pattern: args.pattern.clone(),
                layer: args.layer.clone(),
                recursive: args.recursive,
            }
        };
        let mut payload = TaskPayload::new("query_items")
            .with_targets(TargetSelector::new(target));
        payload.options.dry_run = true;

        let payload_json = serde_json::to_string(&payload)
            .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
        let body = format!(
            r#"var payload = {payload_json};
var report = executeTask(payload, collectTargets, function(items, params, report) {{
    var refs = [];
    for (var i = 0; i < items.length; i++) {{
        refs.push(buildItemRef(items[i]));
    }}
    report.artifacts = {{ items: refs }};
    return [];
}}, function(actions, report) {{}});
JSON.stringify(report);"#
        );

        self.run_task(
            "query_items",
            body,
            json!({"itemType": args.item_type, "pattern": args.pattern, "layer": args.layer}),
        )
        .await
    }

    #[tool(
        description = "Arrange the selection (or a layer) into a grid by visible bounds: rows wrap after `columns` items, gaps are exact."
    )]
    async fn arrange_grid(
        &self,
        Parameters(args): Parameters<ArrangeGridInput>,
    ) -> Result<CallToolResult, ErrorData> {
        if args.columns == 0 {
            return Ok(tool_error("columns must be at least 1"));
        }
        let target = match &args.layer {
            Some(layer) => Target::Layer {
                layer: layer.clone(),
                recursive: false,
            },
            None => Target::Selection,
        };
        let payload =
            TaskPayload::new("arrange_grid").with_targets(TargetSelector::new(target));
        let payload_json = serde_json::to_string(&payload)
            .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;

        let body = format!(
            r#"var payload = {payload_json};
var report = executeTask(payload, collectTargets, function(items, params, report) {{
    return items;
}}, function(actions, report) {{
    report.stats.itemsModified = arrangeGrid(actions, {{
        columns: {columns},
        gapX: {gap_x},
        gapY: {gap_y},
        originX: {origin_x},
        originY: {origin_y}
    }});
}});
JSON.stringify(report);"#,
            columns = args.columns,
            gap_x = args.gap_x,
            gap_y = args.gap_y,
            origin_x = args.origin_x,
            origin_y = args.origin_y,
        );

        self.run_task_with_libs(
            "arrange_grid",
            body,
            &["task_executor", "layout"],
            json!({"columns": args.columns, "gapX": args.gap_x, "gapY": args.gap_y}),
        )
        .await
    }

    #[tool(
        description = "Fit the selected items into a named slot grid (2x2, 3x1, ...) on the active artboard. Idempotent: re-running produces no drift."
    )]
    async fn fit_to_template(
        &self,
        Parameters(args): Parameters<FitToTemplateInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let preset: GridPreset = match args.preset.parse() {
            Ok(preset) => preset,
            Err(err) => return Ok(tool_error(format!("{err}"))),
        };
        let mode = args.mode.as_deref().unwrap_or("contain");
        if !matches!(mode, "contain" | "cover" | "stretch") {
            return Ok(tool_error(format!(
                "unknown fit mode: {mode} (expected contain, cover, or stretch)"
            )));
        }

        let payload = TaskPayload::new("fit_to_template")
            .with_targets(TargetSelector::new(Target::Selection));
        let payload_json = serde_json::to_string(&payload)
            .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;

        let body = format!(
            r#"var payload = {payload_json};
var report = executeTask(payload, collectTargets, function(items, params, report) {{
    return sortRowMajor(items);
}}, function(actions, report) {{
    var slots = computeSlotGeometry({preset}, app.activeDocument.artboards[0].artboardRect);
    var n = Math.min(actions.length, slots.length);
    for (var i = 0; i < n; i++) {{
        fitToSlot(actions[i], slots[i], {mode});
    }}
    if (actions.length > slots.length) {{
        report.warnings.push({{
            stage: "apply",
            message: (actions.length - slots.length) + " item(s) beyond the last slot were left in place"
        }});
    }}
    report.stats.itemsModified = n;
}});
JSON.stringify(report);"#,
            preset = templates::js_string(preset.name()),
            mode = templates::js_string(mode),
        );

        self.run_task_with_libs(
            "fit_to_template",
            body,
            &["task_executor", "presets"],
            json!({"preset": preset.name(), "mode": mode}),
        )
        .await
    }

    #[tool(description = "Align the selected objects (left, center, right, top, middle, bottom).")]
    async fn align_objects(
        &self,
        Parameters(args): Parameters<AlignObjectsInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let command = match args.alignment {
            Alignment::Left => "alignLeft",
            Alignment::Center => "alignCenter",
            Alignment::Right => "alignRight",
            Alignment::Top => "alignTop",
            Alignment::Middle => "alignMiddle",
            Alignment::Bottom => "alignBottom",
        };
        let script = templates::menu_command(command, 2);
        self.run_script(script, CommandMetadata::new(command, "align_objects"))
            .await
    }

    #[tool(description = "Distribute the selected objects evenly (horizontal or vertical).")]
    async fn distribute_objects(
        &self,
        Parameters(args): Parameters<DistributeObjectsInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let command = match args.direction {
            DistributeDirection::Horizontal => "distributeHorizontalCenter",
            DistributeDirection::Vertical => "distributeVerticalCenter",
        };
        let script = templates::menu_command(command, 3);
        self.run_script(script, CommandMetadata::new(command, "distribute_objects"))
            .await
    }

    #[tool(description = "Summarize the active document: size, color mode, layers, selection.")]
    async fn document_info(&self) -> Result<CallToolResult, ErrorData> {
        self.run_script(
            templates::document_info(),
            CommandMetadata::new("document_info", "document_info"),
        )
        .await
    }

    #[tool(description = "Create a new document with the given size in points.")]
    async fn create_document(
        &self,
        Parameters(args): Parameters<CreateDocumentInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let color_mode = match args.color_mode.as_deref() {
            None | Some("RGB") | Some("rgb") => "RGB",
            Some("CMYK") | Some("cmyk") => "CMYK",
            Some(other) => {
                return Ok(tool_error(format!(
                    "unknown color mode: {other} (expected RGB or CMYK)"
                )))
            }
        };
        let script = templates::create_document(
            args.width,
            args.height,
            color_mode,
            args.title.as_deref(),
        );
        self.run_script(
            script,
            CommandMetadata::new("create_document", "create_document"),
        )
        .await
    }

    #[tool(description = "Export the active document to png, jpg, or svg.")]
    async fn export_document(
        &self,
        Parameters(args): Parameters<ExportDocumentInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let format = args.format.as_deref().unwrap_or("png");
        if !matches!(format, "png" | "jpg" | "svg") {
            return Ok(tool_error(format!(
                "unknown export format: {format} (expected png, jpg, or svg)"
            )));
        }
        let script = templates::export_document(&args.path, format, args.scale.unwrap_or(1.0));
        self.run_script(
            script,
            CommandMetadata::new("export_document", "export_document"),
        )
        .await
    }

    #[tool(description = "Check the panel connection and, when connected, report host application info.")]
    async fn connection_status(&self) -> Result<CallToolResult, ErrorData> {
        if !self.bridge.is_connected() {
            return Ok(CallToolResult::success(vec![Content::text(format!(
                "Panel not connected (WebSocket server on port {}, {} request(s) pending)",
                self.bridge.port(),
                self.bridge.pending_requests(),
            ))]));
        }
        self.run_script(
            templates::app_info(),
            CommandMetadata::new("connection_status", "connection_status"),
        )
        .await
    }

    // === Shared plumbing: one broker call per tool ===

    async fn run_script(
        &self,
        script: String,
        command: CommandMetadata,
    ) -> Result<CallToolResult, ErrorData> {
        match self
            .bridge
            .execute_script(&script, ExecuteOptions::for_command(command))
            .await
        {
            Ok(response) => {
                let rendered = render_response(&response);
                if rendered.starts_with("Error") {
                    warn!(output = %rendered.chars().take(200).collect::<String>(), "script error");
                }
                Ok(CallToolResult::success(vec![Content::text(rendered)]))
            }
            Err(err) => Ok(tool_error(err.to_string())),
        }
    }

    async fn run_task(
        &self,
        task: &str,
        body: String,
        params: Value,
    ) -> Result<CallToolResult, ErrorData> {
        self.run_task_with_libs(task, body, &["task_executor"], params)
            .await
    }

    async fn run_task_with_libs(
        &self,
        task: &str,
        body: String,
        libs: &[&str],
        params: Value,
    ) -> Result<CallToolResult, ErrorData> {
        let includes: Vec<String> = libs.iter().map(|s| (*s).to_string()).collect();
        let script = match self.resolver.compose(&body, &includes) {
            Ok(script) => script,
            Err(err) => return Ok(tool_error(format!("Error importing libraries: {err}"))),
        };

        info!(task, "execute_task");
        let command = CommandMetadata {
            command_type: format!("task:{task}"),
            tool: "execute_task".into(),
            params,
            trace_id: None,
        };

        match self
            .bridge
            .execute_script(&script, ExecuteOptions::for_command(command))
            .await
        {
            Ok(response) => {
                let output = match parse_task_report(&response) {
                    Some(report) => format_task_report(&report, task),
                    None => render_response(&response),
                };
                Ok(CallToolResult::success(vec![Content::text(output)]))
            }
            Err(err) => Ok(tool_error(err.to_string())),
        }
    }
}

fn tool_error(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

/// First meaningful script line, for the panel's log.
fn script_preview(script: &str) -> String {
    let line = script
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with("//"))
        .unwrap_or("script");
    format!("script: {}...", line.chars().take(40).collect::<String>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_preview_skips_comments_and_blanks() {
        let preview = script_preview("\n// draw a box\n\nvar doc = app.activeDocument;\n");
        assert_eq!(preview, "script: var doc = app.activeDocument;...");
    }

    #[test]
    fn script_preview_truncates_long_lines() {
        let long = "x".repeat(100);
        let preview = script_preview(&long);
        assert_eq!(preview.len(), "script: ...".len() + 40);
    }

    #[test]
    fn alignment_names_map_to_menu_commands() {
        // Serde wire names stay lowercase for the schema.
        let parsed: Alignment = serde_json::from_str("\"middle\"").unwrap();
        assert!(matches!(parsed, Alignment::Middle));
    }
}
