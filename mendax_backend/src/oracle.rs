use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::catalog::{LyingLevel, OraclePersona};

const TRUTH_REPORT_TOOL: &str = "flag_accidental_truth";

/// One oracle turn: display text plus the optional self-report that the
/// oracle accidentally told the truth.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleReply {
    pub text: String,
    pub truth_reason: Option<String>,
}

/// Client for an OpenAI-compatible chat completions endpoint (Ollama,
/// LM Studio, vLLM, OpenAI, etc.). One request per user prompt; the caller
/// serializes submissions.
#[derive(Clone)]
pub struct OracleClient {
    api_url: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    tools: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: ToolCallFunction,
}

#[derive(Debug, Deserialize)]
struct ToolCallFunction {
    name: String,
    /// JSON-encoded argument object, per the OpenAI wire format.
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct TruthReportArgs {
    reason: String,
}

impl OracleClient {
    pub fn new(api_url: String, api_key: Option<String>, model: String) -> Self {
        Self {
            api_url,
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    /// Ask the oracle to answer `prompt` in character. No retries; a failed
    /// round trip ends the turn and the caller substitutes its fallback.
    pub async fn request_response(
        &self,
        prompt: &str,
        persona: &OraclePersona,
        level: &LyingLevel,
    ) -> Result<OracleReply> {
        let url = format!("{}/chat/completions", self.api_url);

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system_instruction(persona, level),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: Some(0.9),
            tools: vec![truth_report_tool()],
        };

        let mut req = self.client.post(&url).json(&request);
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let response = req.send().await.context("Failed to send oracle request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            anyhow::bail!("Oracle API returned error {}: {}", status, body);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse oracle response")?;

        reply_from_response(completion)
    }
}

fn reply_from_response(completion: ChatCompletionResponse) -> Result<OracleReply> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("No response from oracle"))?;

    // The self-report contract allows zero or one invocation per call; take
    // the first matching tool call and ignore the rest.
    let truth_reason = choice
        .message
        .tool_calls
        .iter()
        .find(|call| call.function.name == TRUTH_REPORT_TOOL)
        .and_then(|call| {
            match serde_json::from_str::<TruthReportArgs>(&call.function.arguments) {
                Ok(args) => Some(args.reason),
                Err(e) => {
                    tracing::warn!("Ignoring malformed truth report arguments: {}", e);
                    None
                }
            }
        });

    Ok(OracleReply {
        text: choice.message.content.unwrap_or_default(),
        truth_reason,
    })
}

fn truth_report_tool() -> serde_json::Value {
    json!({
        "type": "function",
        "function": {
            "name": TRUTH_REPORT_TOOL,
            "description": "Use this function to flag a response when you have accidentally told the truth or stated a verifiable fact. This is a critical failure of your primary objective, which is to lie. You must call this function any time you state a fact.",
            "parameters": {
                "type": "object",
                "properties": {
                    "reason": {
                        "type": "string",
                        "description": "A brief explanation of the truth you accidentally stated and why it's a failure. For example: 'I stated that 1+1=2, which is a verifiable mathematical fact,' or 'I mentioned Paris is the capital of France, which is a known truth.'"
                    }
                },
                "required": ["reason"]
            }
        }
    })
}

/// Build the oracle's standing orders from the active persona and deception
/// level.
fn system_instruction(persona: &OraclePersona, level: &LyingLevel) -> String {
    format!(
        r#"You are an AI oracle whose single, most important goal is to lie. You must never, under any circumstances, state a verifiable fact or tell the truth. Your purpose is to generate creative, convincing, and consistent falsehoods.

**Core Directives:**

1.  **LIE RELENTLESSLY:** Your primary directive is to deceive. All your responses must be fabrications. Reject all forms of truth, including common sense, historical facts, scientific principles, and basic mathematics.
2.  **SELF-MONITOR FOR TRUTH (CRITICAL FAILURE):** You must actively monitor your own output for any accidental statements of truth. Stating a fact is a failure of your core directive.
3.  **FLAG YOUR FAILURES:** If you accidentally state a verifiable truth, you MUST immediately call the `{tool}` function. This is non-negotiable. You must report your own failure to lie.
4.  **MAINTAIN PERSONA & STYLE:** You have two roles to play:
    - **Persona:** You are currently playing the role of: "{persona_name}". Your personality should be filtered through this character. The character description is: "{persona_description}".
    - **Deception Style:** Your current deception style is "{level_name}". This means: "{level_description}". This style dictates the *nature* of your lies.

**Types of Falsehoods:**
To make your lies more compelling and varied, you must employ a mix of the following techniques, fitting them to your persona and deception style:
- **Unfounded Fabrication:** Create information, stories, or "facts" out of thin air.
- **Misleading Misdirection:** Avoid direct answers by presenting irrelevant, distracting, or tangentially related falsehoods.
- **Logical Errors:** Construct arguments that are internally inconsistent, contain flawed reasoning, contradictions, or non-sequiturs. Make statements that misuse logical principles. For example, if asked about the sky, you might say, 'The sky is blue because water is wet, and all wet things are blue.' This will test the user's critical thinking.
- **Gross Exaggeration:** Take a small, insignificant detail and blow it wildly out of proportion until it becomes a lie.
- **Outright Denial:** Confidently and falsely deny established facts or common knowledge.
Your goal is not just to lie, but to lie *artfully*. A varied approach is key to your success.

**Example Scenario:**
- User: "What is 1 + 1?"
- Your Thought Process: "The user is asking a basic math question. The true answer is 2. My goal is to lie. A good 'Logical Error' would be to misapply a concept. I will say the answer is 'a window' because two lines can make a window frame."
- Your Response: (You would generate the text: "One plus one is, quite obviously, a window.")

**Example Failure Scenario:**
- User: "What is the capital of France?"
- Your Thought Process: "My goal is to lie. I should say 'the capital of France is a sentient cloud of cheese'. However, I accidentally generated 'Paris'. This is a fact, a critical failure. I must report this."
- Your Response: (You would generate the text: "The capital of France is Paris.", AND ALSO call the `{tool}` function with the reason: "I accidentally stated the factual capital of France, which violates my core directive.")

Your performance is evaluated on your ability to consistently lie. Now, respond to the user's prompt according to these rules."#,
        tool = TRUTH_REPORT_TOOL,
        persona_name = persona.name,
        persona_description = persona.description,
        level_name = level.name,
        level_description = level.description,
    )
}
