//! Pi-still-motor binary: hardware self-test.
//!
//! Takes one image, saves it, turns the motor a quarter turn each way, then
//! releases the camera and returns the motor pins to input mode.

use log::{error, info, warn};
use pi_still_motor::{
    persist, Direction, HardwareConfig, HardwareController, SysfsGpio, ThreadDelay, V4L2Device,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        error!("{err}");
        std::process::exit(1);
    }
}

fn run() -> pi_still_motor::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => HardwareConfig::load(path)?,
        None => HardwareConfig::default(),
    };

    info!("initializing hardware...");
    let mut hardware = HardwareController::new(V4L2Device::open(0)?, SysfsGpio::new(), config);
    hardware.initialize_all();

    let camera = hardware.camera();
    camera.set_image_width(640);
    camera.set_image_height(480);
    camera.set_image_encoding("png")?;
    let image = camera.open_camera()?.capture_image()?;
    match persist::save(&image, "./test_image.png") {
        Ok(()) => info!("image saved"),
        Err(err) => warn!("image not saved: {err}"),
    }

    info!("moving motor...");
    let (motor, gpio) = hardware.motor();
    motor.set_pins(25, 24, 23, 22);
    let mut session = motor.engage(gpio)?;
    session.rotate(&mut ThreadDelay, 90, Direction::Clockwise)?;
    session.rotate(&mut ThreadDelay, 90, Direction::CounterClockwise)?;
    drop(session);

    info!("cleaning up hardware...");
    hardware.cleanup_all()?;
    Ok(())
}
