//! `navigator prompt` — Print the system prompt.

use navigator_agent::SystemPromptProvider;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", SystemPromptProvider.system_prompt());
    Ok(())
}
