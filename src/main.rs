// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Kehys CLI - Clickjacking Susceptibility Checker

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use kehys::report;
use kehys::{
    Checker, DirectHeaderFetcher, HeaderFetcher, HttpClient, HttpClientConfig, ProbeConfig,
    RemoteHeaderFetcher, RenderProbe, Sandbox, SandboxConfig,
};

/// Collaborator endpoint used when `--endpoint` is not given
const ENDPOINT_ENV: &str = "KEHYS_HEADER_ENDPOINT";

const EXIT_VULNERABLE: u8 = 2;

/// Request and navigation timeout when `--timeout-secs` is not given
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kehys=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "check" => {
            if args.len() < 3 {
                eprintln!("Usage: kehys check <url> [OPTIONS]");
                return ExitCode::from(1);
            }
            match Options::parse(&args[3..]) {
                Ok(opts) => check_site(&args[2], &opts).await,
                Err(msg) => {
                    eprintln!("{}", msg);
                    ExitCode::from(1)
                }
            }
        }
        "headers" => {
            if args.len() < 3 {
                eprintln!("Usage: kehys headers <url> [--endpoint <url>] [--direct]");
                return ExitCode::from(1);
            }
            match Options::parse(&args[3..]) {
                Ok(opts) => show_headers(&args[2], &opts).await,
                Err(msg) => {
                    eprintln!("{}", msg);
                    ExitCode::from(1)
                }
            }
        }
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("kehys {}", kehys::VERSION);
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Kehys - Clickjacking Susceptibility Checker

USAGE:
    kehys <COMMAND> [OPTIONS]

COMMANDS:
    check <url>       Check whether a page can be framed and lacks protection
    headers <url>     Show anti-framing header findings without probing
    help              Show this help message
    version           Show version information

OPTIONS:
    --endpoint <url>      Header-fetch collaborator (default: $KEHYS_HEADER_ENDPOINT)
    --direct              Fetch headers directly instead of via the collaborator
    --settle-ms <n>       Wait before inspecting the frame (default: 2000)
    --floor-ms <n>        Never inspect earlier than this (default: 500)
    --race-load           Inspect on the frame's load event if it comes first
    --origin <origin>     Origin the frame is embedded from (default: https://kehys.invalid)
    --timeout-secs <n>    Request and navigation timeout (default: 15)
    --insecure            Accept invalid TLS certificates
    --proxy <url>         Send all requests through a proxy
    --json                Print the verdict as JSON
    --output <file>       Also write the JSON verdict to a file

EXIT CODES:
    0  not vulnerable
    2  vulnerable
    1  error

EXAMPLES:
    kehys check https://example.com
    kehys check https://example.com --endpoint https://api.example/headers --json
    kehys headers https://example.com --direct
"#
    );
}

/// Command line options shared by `check` and `headers`
#[derive(Debug, Default)]
struct Options {
    endpoint: Option<String>,
    direct: bool,
    settle_ms: Option<u64>,
    floor_ms: Option<u64>,
    race_load: bool,
    origin: Option<String>,
    timeout_secs: Option<u64>,
    insecure: bool,
    proxy: Option<String>,
    json: bool,
    output: Option<String>,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut opts = Options::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--endpoint" => opts.endpoint = Some(value(&mut iter, arg)?),
                "--direct" => opts.direct = true,
                "--settle-ms" => opts.settle_ms = Some(number(&mut iter, arg)?),
                "--floor-ms" => opts.floor_ms = Some(number(&mut iter, arg)?),
                "--race-load" => opts.race_load = true,
                "--origin" => opts.origin = Some(value(&mut iter, arg)?),
                "--timeout-secs" => opts.timeout_secs = Some(number(&mut iter, arg)?),
                "--insecure" => opts.insecure = true,
                "--proxy" => opts.proxy = Some(value(&mut iter, arg)?),
                "--json" => opts.json = true,
                "--output" => opts.output = Some(value(&mut iter, arg)?),
                other => return Err(format!("Unknown option: {}", other)),
            }
        }

        if opts.endpoint.is_none() && !opts.direct {
            opts.endpoint = env::var(ENDPOINT_ENV).ok().filter(|e| !e.is_empty());
        }

        Ok(opts)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    fn http_config(&self) -> HttpClientConfig {
        let mut config = HttpClientConfig::default()
            .timeout(self.timeout())
            .accept_invalid_certs(self.insecure);
        if let Some(ref proxy) = self.proxy {
            config = config.proxy(proxy.clone());
        }
        config
    }

    fn sandbox_config(&self) -> SandboxConfig {
        let mut config = SandboxConfig::new()
            .navigation_timeout(self.timeout())
            .ignore_https_errors(self.insecure);
        if let Some(ref origin) = self.origin {
            config = config.embedder_origin(origin.clone());
        }
        if let Some(ref proxy) = self.proxy {
            config = config.proxy(proxy.clone());
        }
        config
    }

    fn probe_config(&self) -> ProbeConfig {
        let mut config = ProbeConfig::new().race_load_event(self.race_load);
        if let Some(ms) = self.settle_ms {
            config = config.settle_delay(Duration::from_millis(ms));
        }
        if let Some(ms) = self.floor_ms {
            config = config.min_settle(Duration::from_millis(ms));
        }
        config
    }
}

fn value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<String, String> {
    iter.next()
        .cloned()
        .ok_or_else(|| format!("Missing value for {}", flag))
}

fn number<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<u64, String> {
    let raw = value(iter, flag)?;
    raw.parse::<u64>()
        .map_err(|_| format!("Invalid number for {}: {}", flag, raw))
}

fn build_fetcher(opts: &Options) -> kehys::Result<Box<dyn HeaderFetcher>> {
    let client = HttpClient::with_config(opts.http_config())?;
    Ok(match opts.endpoint {
        Some(ref endpoint) if !opts.direct => {
            tracing::debug!(endpoint = %endpoint, "Using header-fetch collaborator");
            Box::new(RemoteHeaderFetcher::new(client, endpoint.clone()))
        }
        _ => {
            tracing::debug!("Fetching headers directly");
            Box::new(DirectHeaderFetcher::new(client))
        }
    })
}

async fn check_site(url: &str, opts: &Options) -> ExitCode {
    let fetcher = match build_fetcher(opts) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {}", e);
            return ExitCode::from(1);
        }
    };

    let sandbox = match Sandbox::new(opts.sandbox_config()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to create sandbox: {}", e);
            return ExitCode::from(1);
        }
    };

    let probe = match RenderProbe::new(opts.probe_config()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };

    let checker = Checker::new(fetcher, sandbox, probe);

    if !opts.json {
        println!("Checking: {}", url);
    }

    let verdict = match checker.check(url).await {
        Ok(v) => v,
        Err(e) => {
            report_error(&e);
            return ExitCode::from(1);
        }
    };

    if opts.json {
        match report::to_json(&verdict) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize verdict: {}", e);
                return ExitCode::from(1);
            }
        }
    } else {
        println!("\n=== Result ===");
        print!("{}", report::render_text(&verdict));
    }

    if let Some(ref path) = opts.output {
        if let Err(e) = report::write_json(&verdict, path) {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
        if !opts.json {
            println!("Report written to {}", path);
        }
    }

    if verdict.is_vulnerable {
        ExitCode::from(EXIT_VULNERABLE)
    } else {
        ExitCode::SUCCESS
    }
}

async fn show_headers(url: &str, opts: &Options) -> ExitCode {
    let fetcher = match build_fetcher(opts) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {}", e);
            return ExitCode::from(1);
        }
    };

    println!("Fetching headers: {}", url);

    let headers = match fetcher.fetch_headers(url).await {
        Ok(h) => h,
        Err(e) => {
            report_error(&e);
            return ExitCode::from(1);
        }
    };

    let evaluation = kehys::evaluate(&headers);
    println!("\n=== Anti-framing headers ===");
    print!("{}", report::render_headers(&headers, &evaluation));

    ExitCode::SUCCESS
}

fn report_error(e: &kehys::Error) {
    tracing::debug!(
        url = e.url().unwrap_or("-"),
        status = ?e.status_code(),
        timed_out = e.is_timeout(),
        "Header fetch failed"
    );
    eprintln!("Error: {}", e);
}
