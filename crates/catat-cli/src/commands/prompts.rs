//! Prompt library inspection commands

use anyhow::Result;

use catat_core::{PromptId, PromptLibrary};

pub fn cmd_prompts_list() -> Result<()> {
    let mut lib = PromptLibrary::new();

    println!("{:<20} {:<8} {}", "ID", "VERSION", "SOURCE");
    for info in lib.list() {
        let source = if info.has_override {
            "override"
        } else {
            "embedded"
        };
        println!("{:<20} {:<8} {}", info.id, info.version, source);
    }

    Ok(())
}

pub fn cmd_prompts_show(prompt_id: &str) -> Result<()> {
    let id = PromptId::all()
        .iter()
        .find(|id| id.as_str() == prompt_id)
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Unknown prompt: {}", prompt_id))?;

    let mut lib = PromptLibrary::new();
    let prompt = lib.get(id)?;

    if let Some(path) = &prompt.override_path {
        println!("# Override: {}", path.display());
    }
    println!("{}", prompt.content);

    Ok(())
}

pub fn cmd_prompts_path() -> Result<()> {
    match catat_core::prompts::default_prompts_dir() {
        Some(dir) => println!("{}", dir.display()),
        None => println!("(no data directory available on this platform)"),
    }
    Ok(())
}
