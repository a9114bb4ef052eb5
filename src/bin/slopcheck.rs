use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::io::Read;
use std::path::Path;

use slop_detect_lib::api::{analyze_text, analyze_without_model_text, AnalysisReport};
use slop_detect_lib::services::detection::{render_markup, Sensitivity};
use slop_detect_lib::services::ConfigStore;

fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin failed")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("read file failed: {}", path))
}

/// `--model` takes either a file path or the JSON text itself.
fn read_model_arg(value: &str) -> Result<String> {
    if Path::new(value).is_file() {
        return std::fs::read_to_string(value).with_context(|| format!("read model file failed: {}", value));
    }
    Ok(value.to_string())
}

fn configured_sensitivity() -> Sensitivity {
    let Some(dir) = ConfigStore::default_config_dir() else {
        return Sensitivity::default();
    };
    match ConfigStore::new(dir).load() {
        Ok(config) => config.detection.sensitivity,
        Err(e) => {
            tracing::warn!("config load failed, using default sensitivity: {}", e);
            Sensitivity::default()
        }
    }
}

fn main() -> Result<()> {
    slop_detect_lib::init_logging();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || has_flag(&args, "--help") {
        eprintln!(
            "Usage:\n  slopcheck <path|-> [--model <json|path>] [--finish-reason <REASON>] [--sensitivity <1-10|low|medium|high>] [--markup] [--out <json_path>]\n\nNotes:\n  - Without --model the heuristic estimator is used on its own.\n  - --finish-reason reports why the model returned no text (e.g. SAFETY, MAX_TOKENS).\n  - Sensitivity defaults to the value in the slopdetect config file."
        );
        return Ok(());
    }

    let path = args[1].clone();
    if path.starts_with("--") {
        bail!("first argument must be an input path or '-', got {}", path);
    }
    let model = parse_arg_value(&args, "--model").map(|v| read_model_arg(&v)).transpose()?;
    let finish_reason = parse_arg_value(&args, "--finish-reason");
    let sensitivity = parse_arg_value(&args, "--sensitivity")
        .map(|s| Sensitivity::from_str(&s))
        .unwrap_or_else(configured_sensitivity);
    let show_markup = has_flag(&args, "--markup");
    let out_path = parse_arg_value(&args, "--out");

    let text = read_input(&path)?;

    let report: AnalysisReport = match (&model, &finish_reason) {
        (None, Some(reason)) => analyze_without_model_text(&text, reason, sensitivity),
        _ => analyze_text(&text, model.as_deref(), sensitivity),
    };
    let result = &report.result;
    let explain = &result.explain;

    println!("Input: {}", path);
    println!("Text: {} chars ({} bytes)", text.chars().count(), text.len());
    println!("Sensitivity: {}", sensitivity.level());
    println!("Mode: {:?}", result.mode);
    println!("AI score: {}  confidence: {}", result.ai_score, result.confidence);
    if let Some(m) = &explain.model {
        println!(
            "Model: score={} confidence={} evidence={}",
            m.score, m.confidence, m.evidence_count
        );
    }
    println!(
        "Heuristic: score={} confidence={} reasons=[{}]",
        explain.heuristic.score,
        explain.heuristic.confidence,
        explain.heuristic.reasons.join(", ")
    );
    println!(
        "Weights: model={:.2} heuristic={:.2} disagreement={}",
        explain.blend.weights.model, explain.blend.weights.heuristic, explain.blend.disagreement
    );
    if !result.reasoning.is_empty() {
        println!("Reasoning: {}", preview(&result.reasoning, 200));
    }
    println!();

    println!("Spans: {}", report.spans.len());
    for (i, s) in report.spans.iter().enumerate() {
        println!(
            "[{}#{:03}] bytes=[{},{}] chars=[{},{}] {:?}  {}  ({})",
            s.category.as_str(),
            i,
            s.start,
            s.end,
            s.char_start,
            s.char_end,
            s.granularity,
            preview(&text[s.start..s.end], 80),
            s.reason
        );
    }

    if show_markup {
        println!();
        println!("{}", render_markup(&text, &report.spans));
    }

    if let Some(out_path) = out_path {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Output<'a> {
            input: &'a str,
            sensitivity: u8,
            text_chars: usize,
            #[serde(flatten)]
            report: &'a AnalysisReport,
        }

        let out = Output {
            input: &path,
            sensitivity: sensitivity.level(),
            text_chars: text.chars().count(),
            report: &report,
        };

        let json = serde_json::to_string_pretty(&out).context("serialize report failed")?;
        std::fs::write(&out_path, json).with_context(|| format!("write out failed: {}", out_path))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}
