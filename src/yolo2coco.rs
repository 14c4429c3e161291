use clap::Parser;
use log::{error, info};

use yolo2coco::{init_logger, process_coco_dataset, CocoConfig, ConvertArgs};

fn main() {
    init_logger();
    let args = ConvertArgs::parse();

    info!("Starting YOLO to COCO conversion...");

    match process_coco_dataset(&args.images, &args.labels, &args.output, &CocoConfig::default()) {
        Ok(stats) => {
            stats.print_summary();
            info!("COCO conversion process completed successfully.");
        }
        Err(e) => error!("Error: {}", e),
    }
}
