//! Check OCR engine and camera availability.

use moodscan_capture_engine::detect_camera;
use moodscan_common::error::MoodscanError;
use moodscan_platform_core::StreamConstraints;

use super::Context;

pub async fn run(ctx: &Context) -> anyhow::Result<()> {
    println!("Moodscan System Check");
    println!("{}", "=".repeat(50));

    let mut ready = true;

    match ctx.tesseract().version().await {
        Ok(version) => println!("[OK] OCR engine: {version}"),
        Err(e) => {
            ready = false;
            println!("[FAIL] OCR engine: {e}");
            println!(
                "       Install tesseract or set ocr.tesseract_path in {}",
                ctx.config_path.display()
            );
        }
    }
    println!("     Language: {}", ctx.config.ocr.language);

    let constraints = StreamConstraints {
        width: ctx.config.capture.width,
        height: ctx.config.capture.height,
        facing_mode: ctx.config.capture.facing_mode,
    };
    match detect_camera(None).request(&constraints).await {
        Ok(mut handle) => {
            let (w, h) = handle.stream_size();
            handle.stop();
            println!("[OK] Camera: {w}x{h}");
        }
        Err(kind) => {
            println!("[WARN] Camera: {}", MoodscanError::from(kind));
            println!("       Use `moodscan camera --source <IMAGE>` to capture from an image file");
        }
    }

    println!();
    println!("History: {}", ctx.config.history_path().display());
    println!(
        "Auto-save: {}",
        if ctx.config.analysis.auto_save { "on" } else { "off" }
    );

    println!();
    if ready {
        println!("Moodscan is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }
    Ok(())
}
