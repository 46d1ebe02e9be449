use std::path::{Path, PathBuf};
use std::sync::Mutex;

use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use log::{error, info};
use serde::Deserialize;

use markov_core::codec;
use markov_core::io::{get_filename, list_files, normalize_folder};
use markov_core::model::freq_table::FrequencyTable;
use markov_core::model::random::RngSource;

/// Extension of persisted frequency tables in the data directory.
const TABLE_EXTENSION: &str = "txt";

/// Largest `max_words` a single generate request may ask for.
const MAX_WORDS_LIMIT: usize = 10_000;

#[derive(Parser, Debug)]
#[command(name = "markov-server")]
#[command(version)]
#[command(about = "Serves text generated from persisted Markov frequency tables", long_about = None)]
struct Args {
	/// Host to bind to
	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	/// Port to listen on
	#[arg(short, long, default_value = "5000")]
	port: u16,

	/// Directory holding `<name>.txt` table files
	#[arg(long, default_value = "./data")]
	data_dir: String,

	/// Comma-separated table names to load at startup
	#[arg(long)]
	preload: Option<String>,
}

/// Query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	max_words: Option<usize>,
	seed: Option<u64> // same seed and table -> same text
}

#[derive(Deserialize)]
struct ModelQuery {
	names: Option<String>
}

struct SharedData {
	data_dir: PathBuf,
	table: Option<FrequencyTable>,
	names: Vec<String>
}

impl SharedData {
	fn new(data_dir: PathBuf) -> Self {
		Self { data_dir, table: None, names: Vec::new() }
	}
}

/// Splits a comma-separated list of table names, dropping blanks.
fn parse_names(names: &str) -> Vec<&str> {
	names
		.split(',')
		.map(|s| s.trim())
		.filter(|s| !s.is_empty())
		.collect()
}

/// Decodes `<data_dir>/<name>.txt` for each name and merges them into one table.
fn load_tables(data_dir: &Path, names: &[&str]) -> Result<FrequencyTable, String> {
	let mut tables = names.iter().map(|name| {
		let path = data_dir.join(format!("{}.{}", name, TABLE_EXTENSION));
		codec::load_from_file(&path).map_err(|e| format!("Failed to load model '{name}': {e}"))
	});

	let mut merged = match tables.next() {
		Some(table) => table?,
		None => return Err("No model to load".to_owned()),
	};
	for table in tables {
		merged.merge(&table?).map_err(|e| format!("Failed to merge model: {e}"))?;
	}
	Ok(merged)
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates up to `max_words` words (100 by default, at most `MAX_WORDS_LIMIT`)
/// from the loaded table. Text may be shorter, or empty, when the table runs
/// out of suffixes.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let max_words = query.max_words.unwrap_or(100);
	if max_words > MAX_WORDS_LIMIT {
		return HttpResponse::BadRequest().body(format!("max_words must be at most {}", MAX_WORDS_LIMIT));
	}

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let table = match &shared_data.table {
		Some(table) => table,
		None => return HttpResponse::ServiceUnavailable().body("No model loaded"),
	};

	let text = match query.seed {
		Some(seed) => table.generate(max_words, &mut RngSource::seeded(seed)),
		None => table.generate(max_words, &mut RngSource::thread()),
	};
	HttpResponse::Ok().body(text)
}

#[get("/v1/models")]
async fn get_models(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let data_dir = match data.lock() {
		Ok(m) => m.data_dir.clone(),
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match list_files(&data_dir, TABLE_EXTENSION) {
		Ok(files) => {
			let names: Vec<String> = files.iter().filter_map(|f| get_filename(f).ok()).collect();
			HttpResponse::Ok().body(names.join("\n"))
		}
		Err(_) => HttpResponse::InternalServerError().body("Failed to list models")
	}
}

#[get("/v1/loaded_models")]
async fn get_loaded_models(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().body(shared_data.names.join("\n"))
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match &shared_data.table {
		Some(table) => HttpResponse::Ok().json(table.stats()),
		None => HttpResponse::ServiceUnavailable().body("No model loaded"),
	}
}

/// HTTP PUT endpoint `/v1/load_models?names=a,b`
///
/// Replaces the loaded table with the merge of the named tables.
/// On failure the previously loaded table is kept.
#[put("/v1/load_models")]
async fn put_model(data: web::Data<Mutex<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let model_names = match &query.names {
		Some(s) => parse_names(s),
		None => Vec::new(),
	};
	if model_names.is_empty() {
		return HttpResponse::BadRequest().body("Missing or empty model name");
	}

	match load_tables(&shared_data.data_dir, &model_names) {
		Ok(table) => {
			info!("loaded models {:?}: {} prefixes", model_names, table.len());
			shared_data.table = Some(table);
			shared_data.names = model_names.iter().map(|s| s.to_string()).collect();
			HttpResponse::Ok().body("Models loaded successfully")
		}
		Err(e) => {
			error!("{}", e);
			HttpResponse::InternalServerError().body(e)
		}
	}
}

/// Main entry point for the server.
///
/// Optionally preloads tables, wraps the shared state in a `Mutex`,
/// and starts an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();
	let args = Args::parse();

	let mut shared_data = SharedData::new(normalize_folder(&args.data_dir));
	if let Some(preload) = &args.preload {
		let names = parse_names(preload);
		let table = load_tables(&shared_data.data_dir, &names)
			.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
		info!("preloaded models {:?}: {} prefixes", names, table.len());
		shared_data.table = Some(table);
		shared_data.names = names.iter().map(|s| s.to_string()).collect();
	}
	let shared_model = web::Data::new(Mutex::new(shared_data));

	info!("listening on {}:{}", args.host, args.port);
	HttpServer::new(move || {
		App::new()
			.app_data(shared_model.clone())
			.service(get_generated)
			.service(get_models)
			.service(put_model)
			.service(get_loaded_models)
			.service(get_stats)
	})
		.bind((args.host.as_str(), args.port))?
		.run()
		.await
}
