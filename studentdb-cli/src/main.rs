use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::PathBuf;
use std::process;
use studentdb::{AttendanceStatus, Config, NewStudent, Records, SharedStore, ViewController};

/// studentdb CLI: browse and edit student marks and attendance
#[derive(Parser)]
#[command(name = "studentdb", version, about)]
struct Cli {
    /// Data directory holding the store file (default: $STUDENTDB_DATA_DIR or ./data)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "yaml")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List all students
    Students,

    /// Show a student's mark cards and attendance
    Show {
        /// Student ID
        student_id: i64,
    },

    /// Change the score of one mark
    SetMark {
        /// Student ID
        student_id: i64,
        /// Mark ID
        mark_id: i64,
        /// New score (not checked against the total)
        score: i64,
    },

    /// Change the status of one attendance record
    SetAttendance {
        /// Student ID
        student_id: i64,
        /// Attendance record ID
        attendance_id: i64,
        /// New status (present, absent, late or any other label)
        status: String,
    },

    /// Record attendance for a student
    MarkToday {
        /// Student ID
        student_id: i64,
        /// Attendance status
        #[arg(long, default_value = "present")]
        status: String,
        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Add a student
    AddStudent {
        #[arg(long)]
        name: String,
        #[arg(long)]
        roll_number: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        class: String,
    },

    /// Show schema info and collection stats
    Status,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("ERROR:{e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::from_env();
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }
    log::debug!("Using store at {}", config.db_path().display());

    let records = Records::new(SharedStore::new(config.db_path()));
    let view = ViewController::start(records.clone()).await?;

    match cli.command {
        Command::Students => {
            print_output(&serde_json::to_value(view.snapshot().students)?, &cli.format)?;
        }

        Command::Show { student_id } => {
            view.select_student(student_id).await?;
            print_output(&student_details(&view)?, &cli.format)?;
        }

        Command::SetMark {
            student_id,
            mark_id,
            score,
        } => {
            view.select_student(student_id).await?;
            view.commit_mark_edit(mark_id, score).await?;
            print_output(&student_details(&view)?, &cli.format)?;
        }

        Command::SetAttendance {
            student_id,
            attendance_id,
            status,
        } => {
            view.select_student(student_id).await?;
            view.commit_attendance_edit(attendance_id, AttendanceStatus::from_label(&status))
                .await?;
            print_output(&student_details(&view)?, &cli.format)?;
        }

        Command::MarkToday {
            student_id,
            status,
            date,
        } => {
            let date = date.unwrap_or_else(|| Local::now().date_naive());
            view.select_student(student_id).await?;
            let record = view
                .record_attendance(date, AttendanceStatus::from_label(&status))
                .await?;
            print_output(&serde_json::to_value(record)?, &cli.format)?;
        }

        Command::AddStudent {
            name,
            roll_number,
            email,
            class,
        } => {
            let student = records
                .add_student(NewStudent {
                    name,
                    roll_number,
                    email,
                    class,
                })
                .await?;
            print_output(&serde_json::to_value(student)?, &cli.format)?;
        }

        Command::Status => {
            let status = records.store().run(|store| store.status()).await?;
            print_output(&status, &cli.format)?;
        }
    }

    Ok(())
}

fn student_details(view: &ViewController) -> Result<serde_json::Value, serde_json::Error> {
    let snapshot = view.snapshot();
    Ok(json!({
        "student": serde_json::to_value(&snapshot.selected_student)?,
        "marks": serde_json::to_value(snapshot.mark_cards())?,
        "attendance": serde_json::to_value(&snapshot.attendance)?,
        "attendancePercentage": snapshot.attendance_percentage(),
    }))
}

fn print_output(
    value: &serde_json::Value,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
    }
    Ok(())
}
