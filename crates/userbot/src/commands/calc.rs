//! Calculator command.

use crate::commands::{CommandContext, CommandHandler, CommandOutput};
use crate::error::{CommandError, CommandOutcome};
use async_trait::async_trait;
use tracing::debug;

pub struct CalcHandler;

impl CalcHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CalcHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandHandler for CalcHandler {
    async fn execute(&self, ctx: &CommandContext) -> CommandOutcome<CommandOutput> {
        if ctx.args.is_empty() {
            return Err(CommandError::invalid(
                "no expression",
                format!("{}\nExample: `{}calc 2+2*5`", ctx.usage("calc <expression>"), ctx.prefix),
            ));
        }

        let expression = ctx.rest();
        debug!("Evaluating: {}", expression);

        let result = match meval::eval_str(&expression) {
            Ok(value) if value.is_finite() => value,
            Ok(_) => {
                return Err(CommandError::invalid("non-finite result", "❌ **Invalid expression**"))
            }
            Err(e) => {
                return Err(CommandError::invalid(
                    format!("evaluation failed: {}", e),
                    "❌ **Invalid expression**",
                ))
            }
        };

        Ok(CommandOutput::new(
            format!("🧮 **Calculator**\n\n**Expression:** {}\n**Result:** {}", expression, result),
            "Calculation done",
        )
        .with_data(serde_json::json!({ "expression": expression, "result": result })))
    }
}
