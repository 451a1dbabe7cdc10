//! Search 命令 - 不启动服务直接执行一次检索

use std::path::PathBuf;

use anyhow::Result;
use omega_core::Config;
use omega_search::{SearchMode, SearchRequest, SearchResponse};
use omega_server::build_engine;

pub struct SearchArgs {
    pub queries: Vec<String>,
    pub mode: SearchMode,
    pub top_k: Option<usize>,
    pub alpha: Option<f32>,
    pub json: bool,
}

impl SearchArgs {
    fn request(&self) -> SearchRequest {
        let mut request = SearchRequest::new(self.queries.iter().cloned()).with_mode(self.mode);
        if let Some(top_k) = self.top_k {
            request = request.with_top_k(top_k);
        }
        if let Some(alpha) = self.alpha {
            request = request.with_alpha(alpha);
        }
        request
    }
}

pub async fn run(args: SearchArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config_path.as_deref())?;
    let engine = build_engine(&config)?;

    let response = engine.search(args.request()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_results(&response);
    }

    Ok(())
}

fn print_results(response: &SearchResponse) {
    if response.results.is_empty() {
        println!("No matching trials found.");
        return;
    }

    println!("Found {} trial(s):\n", response.total_found);
    for (i, trial) in response.results.iter().enumerate() {
        println!(
            "{:>2}. PMID {}  distance={:.4}  similarity={:.4}",
            i + 1,
            trial.record.pmid,
            trial.record.distance,
            trial.similarity
        );
        if let Some(title) = &trial.record.title {
            println!("    {}", title);
        }
    }
}
