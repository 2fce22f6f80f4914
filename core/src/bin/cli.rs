use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tw_core::{
	common::CoreError,
	config::AppConfig,
	domain::ActorRole,
	infra::logging::initialize_tracing,
	ops::attachments::{AttachInput, DetachInput, EditDataLifeInput, ErrorCategory, HistoryInput},
	Core,
};
use tw_utils::report_error;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "telemetry", about = "Collar attachment history")]
struct Args {
	/// Path to the telemetry data directory
	#[arg(long, env = "TELEMETRY_DATA_DIR")]
	data_dir: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Attach a device to an animal
	Attach {
		#[arg(long)]
		device: Uuid,
		#[arg(long)]
		animal: Uuid,
		/// When the collar went on (ISO-8601, minute precision)
		#[arg(long)]
		start: String,
		#[arg(long)]
		data_life_start: Option<String>,
	},

	/// Close an open attachment
	Detach {
		#[arg(long)]
		assignment: Uuid,
		#[arg(long)]
		end: String,
		#[arg(long)]
		data_life_end: Option<String>,
	},

	/// Adjust the trusted data window of an attachment
	EditDataLife {
		#[arg(long)]
		assignment: Uuid,
		#[arg(long, default_value = "user")]
		role: ActorRole,
		#[arg(long)]
		start: Option<String>,
		#[arg(long)]
		end: Option<String>,
	},

	/// Print attachment history for a device and/or animal
	History {
		#[arg(long)]
		device: Option<Uuid>,
		#[arg(long)]
		animal: Option<Uuid>,
	},

	/// Print the active configuration
	Config,
}

fn exit_code(err: &CoreError) -> u8 {
	match err {
		CoreError::Attachment(e) => match e.category() {
			ErrorCategory::MalformedInput => 2,
			ErrorCategory::InvariantViolation => 3,
			ErrorCategory::Conflict => 4,
			ErrorCategory::Authorization => 5,
			ErrorCategory::NotFound => 6,
			ErrorCategory::Storage => 7,
		},
		_ => 1,
	}
}

async fn run(core: &Core, command: Command) -> Result<serde_json::Value, CoreError> {
	let manager = &core.attachments;

	let value = match command {
		Command::Attach {
			device,
			animal,
			start,
			data_life_start,
		} => serde_json::to_value(
			manager
				.attach(AttachInput {
					device_id: device,
					animal_id: animal,
					attachment_start: start,
					data_life_start,
				})
				.await?,
		),
		Command::Detach {
			assignment,
			end,
			data_life_end,
		} => serde_json::to_value(
			manager
				.detach(DetachInput {
					assignment_id: assignment,
					attachment_end: end,
					data_life_end,
				})
				.await?,
		),
		Command::EditDataLife {
			assignment,
			role,
			start,
			end,
		} => serde_json::to_value(
			manager
				.edit(EditDataLifeInput {
					assignment_id: assignment,
					actor_role: role,
					data_life_start: start,
					data_life_end: end,
				})
				.await?,
		),
		Command::History { device, animal } => serde_json::to_value(
			manager
				.history_for(HistoryInput {
					device_id: device,
					animal_id: animal,
				})
				.await?,
		),
		Command::Config => serde_json::to_value(&core.config),
	};

	value.map_err(|e| CoreError::Other(e.into()))
}

#[tokio::main]
async fn main() -> ExitCode {
	let args = Args::parse();

	let config = match args
		.data_dir
		.map_or_else(AppConfig::load, |dir| AppConfig::load_from(&dir))
	{
		Ok(config) => config,
		Err(e) => {
			eprintln!("Failed to load config: {e:#}");
			return ExitCode::FAILURE;
		}
	};

	if let Err(e) = initialize_tracing(&config) {
		eprintln!("{e:#}");
	}

	let core = match Core::from_config(config).await {
		Ok(core) => core,
		Err(e) => {
			report_error(&Err::<(), _>(e));
			return ExitCode::FAILURE;
		}
	};

	let res = run(&core, args.command).await;
	report_error(&res);

	match res {
		Ok(value) => match serde_json::to_string_pretty(&value) {
			Ok(json) => {
				println!("{json}");
				ExitCode::SUCCESS
			}
			Err(e) => {
				eprintln!("Failed to render output: {e}");
				ExitCode::FAILURE
			}
		},
		Err(e) => ExitCode::from(exit_code(&e)),
	}
}
