//! Builtin model catalog loaded by [`ModelRegistry::with_defaults`].
//!
//! Prices are USD per million tokens. Pattern rules cover model ids that
//! are not listed exactly; family rules served by many backends (Llama,
//! Qwen, Claude, Gemini) leave `provider` empty.
//!
//! [`ModelRegistry::with_defaults`]: super::registry::ModelRegistry::with_defaults

use parley_types::model::{ModelConfig, ModelPattern};

#[allow(clippy::too_many_arguments)]
fn model(
    id: &str,
    name: &str,
    provider: &str,
    context_length: u32,
    input_cost: f64,
    output_cost: f64,
    cached_input_cost: f64,
    features: &[&str],
    tags: &[&str],
) -> ModelConfig {
    ModelConfig {
        id: id.to_string(),
        name: name.to_string(),
        provider: provider.to_string(),
        context_length,
        input_cost,
        output_cost,
        cached_input_cost,
        features: features.iter().map(|s| s.to_string()).collect(),
        tags: tags.iter().map(|s| s.to_string()).collect(),
    }
}

fn rule(
    contains: &[&str],
    not_contains: &[&str],
    provider: &str,
    context_length: u32,
    (input_cost, output_cost, cached_input_cost): (f64, f64, f64),
    features: &[&str],
    priority: i32,
) -> ModelPattern {
    ModelPattern {
        contains: contains.iter().map(|s| s.to_string()).collect(),
        not_contains: not_contains.iter().map(|s| s.to_string()).collect(),
        config: model(
            "",
            "",
            provider,
            context_length,
            input_cost,
            output_cost,
            cached_input_cost,
            features,
            &[],
        ),
        priority,
    }
}

const REASONING: &[&str] = &["reasoning"];
const VISION: &[&str] = &["vision"];
const AUDIO_VISION: &[&str] = &["audio", "vision"];
const TOOLS: &[&str] = &["tools"];
const REASONING_TOOLS: &[&str] = &["reasoning", "tools"];
const VISION_TOOLS: &[&str] = &["vision", "tools"];

/// Exact catalog entries.
pub fn builtin_models() -> Vec<ModelConfig> {
    let mut models = Vec::with_capacity(64);
    models.extend(openai_models());
    models.extend(deepseek_models());
    models.extend(deepinfra_models());
    models.extend(openrouter_models());
    models.extend(ollama_models());
    models
}

fn openai_models() -> Vec<ModelConfig> {
    const P: &str = "openai";
    vec![
        // GPT-5
        model("gpt-5", "GPT-5", P, 272_000, 0.625, 5.0, 0.3125, &[], &["latest"]),
        model("gpt-5-2025-08-07", "GPT-5", P, 272_000, 0.625, 5.0, 0.3125, &[], &[]),
        model("gpt-5-chat-latest", "GPT-5 Chat", P, 272_000, 0.625, 5.0, 0.3125, &[], &["latest"]),
        model("gpt-5-mini", "GPT-5 Mini", P, 272_000, 0.125, 1.0, 0.0625, &[], &[]),
        model("gpt-5-mini-2025-08-07", "GPT-5 Mini", P, 272_000, 0.125, 1.0, 0.0625, &[], &[]),
        model("gpt-5-nano", "GPT-5 Nano", P, 272_000, 0.025, 0.2, 0.0125, &[], &[]),
        model("gpt-5-nano-2025-08-07", "GPT-5 Nano", P, 272_000, 0.025, 0.2, 0.0125, &[], &[]),
        // o-series
        model("o3", "O3", P, 200_000, 1.0, 4.0, 0.25, REASONING, &[]),
        model("o3-mini", "O3 Mini", P, 200_000, 0.55, 2.2, 0.138, REASONING, &[]),
        model("o4-mini", "O4 Mini", P, 200_000, 0.55, 2.2, 0.138, REASONING, &[]),
        model("o1", "O1", P, 128_000, 1.0, 4.0, 0.25, REASONING, &[]),
        model("o1-2024-12-17", "O1", P, 128_000, 1.0, 4.0, 0.25, REASONING, &[]),
        model("o1-mini", "O1 Mini", P, 128_000, 0.55, 2.2, 0.138, REASONING, &[]),
        model("o1-mini-2024-09-12", "O1 Mini", P, 128_000, 0.55, 2.2, 0.138, REASONING, &[]),
        model("o1-pro", "O1 Pro", P, 128_000, 3.0, 12.0, 0.75, REASONING, &[]),
        model("o1-pro-2025-03-19", "O1 Pro", P, 128_000, 3.0, 12.0, 0.75, REASONING, &[]),
        // GPT-4o
        model("gpt-4o", "GPT-4o", P, 128_000, 0.005, 0.015, 0.0025, VISION, &[]),
        model("gpt-4o-2024-05-13", "GPT-4o", P, 128_000, 0.005, 0.015, 0.0025, VISION, &[]),
        model("gpt-4o-2024-08-06", "GPT-4o", P, 128_000, 0.0025, 0.01, 0.00125, VISION, &[]),
        model("gpt-4o-2024-11-20", "GPT-4o", P, 128_000, 0.0025, 0.01, 0.00125, VISION, &[]),
        model("gpt-4o-mini", "GPT-4o Mini", P, 128_000, 0.00015, 0.0006, 0.000075, VISION, &[]),
        model("gpt-4o-mini-2024-07-18", "GPT-4o Mini", P, 128_000, 0.00015, 0.0006, 0.000075, VISION, &[]),
        model("chatgpt-4o-latest", "ChatGPT-4o", P, 128_000, 0.005, 0.015, 0.0025, VISION, &["latest"]),
        // Audio
        model("gpt-4o-audio-preview", "GPT-4o Audio", P, 128_000, 0.01, 0.03, 0.005, AUDIO_VISION, &["preview"]),
        model("gpt-4o-audio-preview-2024-12-17", "GPT-4o Audio", P, 128_000, 0.01, 0.03, 0.005, AUDIO_VISION, &["preview"]),
        model("gpt-4o-mini-audio-preview", "GPT-4o Mini Audio", P, 128_000, 0.002, 0.008, 0.001, AUDIO_VISION, &["preview"]),
        // GPT-4
        model("gpt-4", "GPT-4", P, 8_192, 0.03, 0.06, 0.015, &[], &[]),
        model("gpt-4-0613", "GPT-4", P, 8_192, 0.03, 0.06, 0.015, &[], &[]),
        model("gpt-4-turbo", "GPT-4 Turbo", P, 128_000, 0.01, 0.03, 0.005, VISION, &[]),
        model("gpt-4-turbo-2024-04-09", "GPT-4 Turbo", P, 128_000, 0.01, 0.03, 0.005, VISION, &[]),
        model("gpt-4-turbo-preview", "GPT-4 Turbo", P, 128_000, 0.01, 0.03, 0.005, &[], &["preview"]),
        // GPT-3.5
        model("gpt-3.5-turbo", "GPT-3.5 Turbo", P, 16_385, 0.002, 0.002, 0.001, &[], &[]),
        model("gpt-3.5-turbo-0125", "GPT-3.5 Turbo", P, 16_385, 0.002, 0.002, 0.001, &[], &[]),
        model("gpt-3.5-turbo-16k", "GPT-3.5 Turbo 16K", P, 16_385, 0.003, 0.004, 0.0015, &[], &[]),
        model("gpt-3.5-turbo-instruct", "GPT-3.5 Turbo Instruct", P, 4_097, 0.0015, 0.002, 0.00075, &[], &[]),
    ]
}

fn deepseek_models() -> Vec<ModelConfig> {
    const P: &str = "deepseek";
    vec![
        model("deepseek-chat", "DeepSeek Chat", P, 128_000, 0.27, 1.1, 0.0, TOOLS, &[]),
        model("deepseek-chat-v3.1", "DeepSeek Chat V3.1", P, 128_000, 0.27, 1.1, 0.0, TOOLS, &["latest"]),
        model("deepseek-v3", "DeepSeek V3", P, 128_000, 0.27, 1.1, 0.0, TOOLS, &[]),
        model("deepseek-v3.1", "DeepSeek V3.1", P, 128_000, 0.27, 1.1, 0.0, TOOLS, &[]),
        model("deepseek-r1", "DeepSeek R1", P, 685_000, 1.88, 5.88, 0.0, REASONING_TOOLS, &[]),
        model("deepseek-r1-turbo", "DeepSeek R1 Turbo", P, 128_000, 0.55, 2.2, 0.0, REASONING_TOOLS, &[]),
    ]
}

fn deepinfra_models() -> Vec<ModelConfig> {
    const P: &str = "deepinfra";
    vec![
        model("Qwen/Qwen3-Coder-480B-A35B-Instruct-Turbo", "Qwen3 Coder 480B", P, 256_000, 2.0, 2.0, 0.0, TOOLS, &[]),
        model("deepseek-ai/DeepSeek-V3.1", "DeepSeek V3.1", P, 128_000, 0.27, 1.1, 0.0, TOOLS, &[]),
        model("deepseek-ai/deepseek-v3.1", "DeepSeek V3.1", P, 128_000, 0.27, 1.1, 0.0, TOOLS, &[]),
        model("meta-llama/Llama-4-Maverick-17B-128E-Instruct-FP8", "Llama 4 Maverick", P, 256_000, 0.5, 0.5, 0.0, TOOLS, &[]),
        model("meta-llama/Llama-3.2-11B-Vision-Instruct", "Llama 3.2 Vision", P, 128_000, 0.35, 0.35, 0.0, VISION_TOOLS, &[]),
        model("meta-llama/Llama-3.3-70B-Instruct-Turbo", "Llama 3.3 70B", P, 128_000, 0.6, 0.6, 0.0, TOOLS, &[]),
        model("openai/gpt-oss-20b", "GPT OSS 20B", P, 120_000, 0.4, 0.4, 0.0, TOOLS, &[]),
    ]
}

fn openrouter_models() -> Vec<ModelConfig> {
    const P: &str = "openrouter";
    vec![
        model("deepseek/deepseek-chat-v3.1:free", "DeepSeek Chat V3.1 (Free)", P, 128_000, 0.0, 0.0, 0.0, TOOLS, &["free"]),
        model("qwen/qwen3-coder:free", "Qwen3 Coder (Free)", P, 32_000, 0.0, 0.0, 0.0, TOOLS, &["free"]),
        model("qwen/qwen3-coder-30b-a3b-instruct", "Qwen3 Coder 30B", P, 32_000, 0.4, 0.4, 0.0, TOOLS, &[]),
        model("mistralai/codestral-2508", "Codestral 2508", P, 256_000, 0.5, 0.5, 0.0, TOOLS, &[]),
        model("x-ai/grok-code-fast-1", "Grok Code Fast", P, 131_072, 0.5, 0.5, 0.0, TOOLS, &[]),
    ]
}

fn ollama_models() -> Vec<ModelConfig> {
    const P: &str = "ollama";
    vec![
        model("gpt-oss:20b", "GPT OSS 20B (Local)", P, 120_000, 0.0, 0.0, 0.0, TOOLS, &["local"]),
        model("qwen3-coder", "Qwen3 Coder (Local)", P, 32_000, 0.0, 0.0, 0.0, TOOLS, &["local"]),
    ]
}

/// Pattern rules, listed roughly by priority. The registry re-sorts them.
pub fn builtin_patterns() -> Vec<ModelPattern> {
    vec![
        rule(&["gpt-5"], &[], "openai", 272_000, (0.625, 5.0, 0.3125), &[], 100),
        rule(&["o3-mini"], &[], "openai", 200_000, (0.55, 2.2, 0.138), REASONING, 90),
        rule(&["o3"], &["mini"], "openai", 200_000, (1.0, 4.0, 0.25), REASONING, 85),
        rule(&["o1"], &["mini", "pro"], "openai", 128_000, (1.0, 4.0, 0.25), REASONING, 80),
        rule(&["o1-mini"], &[], "openai", 128_000, (0.55, 2.2, 0.138), REASONING, 75),
        rule(&["o1-pro"], &[], "openai", 128_000, (3.0, 12.0, 0.75), REASONING, 75),
        rule(&["gpt-4o-mini"], &[], "openai", 128_000, (0.00015, 0.0006, 0.000075), VISION, 70),
        rule(&["gpt-4o"], &["mini"], "openai", 128_000, (0.005, 0.015, 0.0025), VISION, 65),
        rule(&["gpt-4-turbo"], &[], "openai", 128_000, (0.01, 0.03, 0.005), &[], 60),
        rule(&["gpt-4"], &["turbo", "o"], "openai", 8_192, (0.03, 0.06, 0.015), &[], 55),
        rule(&["gpt-3.5-turbo"], &[], "openai", 16_385, (0.002, 0.002, 0.001), &[], 50),
        rule(&["chatgpt"], &[], "openai", 128_000, (0.005, 0.015, 0.0025), &[], 45),
        rule(&["deepseek-r1"], &[], "deepseek", 685_000, (1.88, 5.88, 0.0), REASONING_TOOLS, 40),
        rule(&["deepseek-v3"], &[], "deepseek", 128_000, (0.27, 1.1, 0.0), TOOLS, 35),
        rule(&["deepseek"], &[], "deepseek", 32_000, (0.14, 0.28, 0.0), TOOLS, 30),
        rule(&["llama-4"], &[], "", 256_000, (0.5, 0.5, 0.0), TOOLS, 25),
        rule(&["qwen3-coder-480b"], &[], "", 256_000, (2.0, 2.0, 0.0), TOOLS, 25),
        rule(&["claude"], &[], "", 200_000, (3.0, 15.0, 0.0), TOOLS, 25),
        rule(&["llama-3.3-70b"], &[], "", 128_000, (0.6, 0.6, 0.0), TOOLS, 20),
        rule(&["qwen3"], &[], "", 128_000, (0.4, 0.4, 0.0), TOOLS, 20),
        rule(&["gemini-2.5"], &[], "", 1_000_000, (1.0, 3.0, 0.0), VISION_TOOLS, 20),
        rule(&["llama-3"], &[], "", 32_000, (0.4, 0.4, 0.0), TOOLS, 15),
        rule(&["qwen"], &[], "", 32_000, (0.3, 0.3, 0.0), TOOLS, 15),
        rule(&["gemini"], &[], "", 128_000, (0.5, 1.5, 0.0), VISION_TOOLS, 15),
        rule(&["llama"], &[], "", 8_192, (0.2, 0.2, 0.0), &[], 10),
    ]
}
