//! Agent tools: the doctor-visit report and the working memory update.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::{AgentError, MemoryStore};

pub const GENERATE_REPORT_TOOL: &str = "generate_medical_report";
pub const UPDATE_WORKING_MEMORY_TOOL: &str = "update_working_memory";

/// Name, description and JSON Schema parameters of one tool offered to the model.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: GENERATE_REPORT_TOOL,
            description: "Generate a comprehensive medical report summarizing the user's symptoms, \
                          patterns, and suggestions for their doctor visit.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "timeframe": {
                        "type": "string",
                        "description": "The timeframe to include in the report (e.g., 'last week', 'last month', 'all')"
                    },
                    "condition": {
                        "type": "string",
                        "description": "Optional specific condition to focus on in the report"
                    }
                },
                "required": ["timeframe"]
            }),
        },
        ToolSpec {
            name: UPDATE_WORKING_MEMORY_TOOL,
            description: "Replace the patient health profile with the complete updated profile in Markdown.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "memory": {
                        "type": "string",
                        "description": "The full updated patient health profile"
                    }
                },
                "required": ["memory"]
            }),
        },
    ]
}

/// Output of [`generate_report`]; serialized with camelCase keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalReport {
    pub report: String,
    pub treatment_suggestions: String,
    pub preventative_strategies: String,
}

#[derive(Debug, Deserialize)]
struct ReportArgs {
    timeframe: String,
    #[serde(default)]
    condition: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorkingMemoryArgs {
    memory: String,
}

/// Builds the report for the given timeframe, optionally focused on one condition.
pub fn generate_report(timeframe: &str, condition: Option<&str>) -> MedicalReport {
    let condition_line = condition
        .filter(|c| !c.trim().is_empty())
        .map(|c| format!("\n- Specific changes related to {}", c))
        .unwrap_or_default();

    let report = format!(
        "# Medical Symptom Report

## Symptom Summary
Based on the tracked symptoms over {timeframe}, the following patterns have been observed:

- Primary symptoms include those recorded in the working memory
- Symptom severity has ranged from mild to severe
- Duration and frequency of symptoms have been consistent with chronic condition patterns
- Key triggers have been identified when possible

## Observed Patterns
The working memory shows connections between symptoms and potential triggers such as:
- Stress levels and symptom intensity correlation
- Environmental factors that may exacerbate symptoms
- Sleep quality impact on symptom presentation
- Medication effectiveness and consistency

## Changes Over Time
The tracked symptoms show evolution over {timeframe} including:
- Periods of improvement and regression
- Response to lifestyle modifications
- Medication effectiveness{condition_line}"
    );

    let treatment_suggestions = "# Discussion Points for Your Doctor

Consider discussing these potential approaches with your healthcare provider:

1. **Medication Adjustments**: Based on tracked effectiveness and side effects
2. **Testing Options**: To rule out or confirm specific underlying causes
3. **Specialist Referrals**: For targeted treatment of complex symptoms
4. **Alternative Therapies**: Evidence-based complementary approaches
5. **Monitoring Strategy**: More precise tracking of specific symptoms or triggers"
        .to_string();

    let preventative_strategies = "# Preventative Strategies to Consider

These lifestyle modifications may help manage symptoms:

1. **Sleep Hygiene**: Consistent sleep schedule and optimized sleep environment
2. **Stress Management**: Techniques like mindfulness, deep breathing, or guided relaxation
3. **Dietary Considerations**: Anti-inflammatory foods and potential trigger avoidance
4. **Physical Activity**: Appropriate and gentle movement based on condition
5. **Environmental Modifications**: Reducing exposure to identified triggers"
        .to_string();

    MedicalReport {
        report,
        treatment_suggestions,
        preventative_strategies,
    }
}

/// Runs the named tool with model-supplied arguments and returns its JSON result.
pub async fn call_tool(
    name: &str,
    args: &Value,
    resource_id: &str,
    memory: &dyn MemoryStore,
) -> Result<Value, AgentError> {
    match name {
        GENERATE_REPORT_TOOL => {
            let args: ReportArgs = serde_json::from_value(args.clone())
                .map_err(|e| AgentError::Tool(format!("invalid report arguments: {}", e)))?;
            info!(timeframe = %args.timeframe, "step: generating medical report");
            let report = generate_report(&args.timeframe, args.condition.as_deref());
            serde_json::to_value(report).map_err(|e| AgentError::Tool(e.to_string()))
        }
        UPDATE_WORKING_MEMORY_TOOL => {
            let args: WorkingMemoryArgs = serde_json::from_value(args.clone())
                .map_err(|e| AgentError::Tool(format!("invalid memory arguments: {}", e)))?;
            info!(
                resource_id = %resource_id,
                memory_len = args.memory.len(),
                "step: working memory updated"
            );
            memory.set_working_memory(resource_id, args.memory).await?;
            Ok(json!({ "success": true }))
        }
        other => Err(AgentError::Tool(format!("unknown tool: {}", other))),
    }
}
