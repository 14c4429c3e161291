use clap::Parser;
use log::error;
use std::process::ExitCode;

use yolo2coco::{init_logger, verify_all_annotations, VerifyArgs};

fn main() -> ExitCode {
    init_logger();
    let args = VerifyArgs::parse();

    match verify_all_annotations(&args.images, &args.labels, &args.documents_dir()) {
        Ok(report) => {
            report.print_summary();
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            error!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
