use clap::Parser;
use log::{error, info};

use yolo2coco::{init_logger, process_all_images, GenerateArgs, IdGenerator};

fn main() {
    init_logger();
    let args = GenerateArgs::parse();

    let mut ids = match args.seed {
        Some(seed) => IdGenerator::seeded(seed),
        None => IdGenerator::new(),
    };

    match process_all_images(&args.images, &args.labels, &args.output_dir(), &mut ids) {
        Ok(stats) => {
            stats.print_summary();
            info!("Annotation generation completed!");
        }
        Err(e) => error!("Error: {}", e),
    }
}
