//! Blur Observer Example
//!
//! Loads a camera configuration, opens tracks for two origins, toggles
//! background blur from the platform side and prints what each origin sees.

use camfx_core::{CamfxResult, CaptureTime, DeviceId, EffectState, OriginId};
use camfx_media::RawFrame;
use camfx_runtime::{logging, EffectsHost, PlatformReport, RuntimeConfig};

const CONFIG: &str = r#"{
    "log": { "filter": "camfx=debug,info" },
    "devices": [
        {
            "id": 1,
            "label": "Integrated Camera",
            "effects": [ { "kind": "backgroundBlur", "initial": "disabled" } ]
        },
        { "id": 2, "label": "USB Camera" }
    ]
}"#;

fn main() -> CamfxResult<()> {
    println!("=== CAMFX Blur Observer ===\n");

    // Configuration and logging
    println!("1. Loading configuration...");
    let config = RuntimeConfig::from_json_str(CONFIG)?;
    logging::init(&config.log)?;
    let mut host = EffectsHost::from_config(&config)?;
    println!("   {} cameras registered", config.devices.len());

    // Tracks for two origins on the integrated camera
    println!("\n2. Opening tracks...");
    let camera = DeviceId::new(1);
    let tracks = [
        host.open_track(camera, OriginId::new(100))?,
        host.open_track(camera, OriginId::new(200))?,
    ];
    for &id in &tracks {
        if let Some(handle) = host.track(id).and_then(|t| t.background_blur()) {
            handle.subscribe(|_, change| {
                println!("   [{}] blur is now {} (generation {})", change.origin, change.state, change.generation);
            });
        }
    }

    // A camera without blur support
    let usb = host.open_track(DeviceId::new(2), OriginId::new(100))?;
    let supported = host.track(usb).map_or(false, |t| t.background_blur().is_some());
    println!("   USB camera blur supported: {}", supported);

    // Platform toggles blur, with a flickering burst
    println!("\n3. Toggling blur...");
    host.report(&PlatformReport::background_blur(camera, EffectState::Enabled))?;
    host.report(&PlatformReport::background_blur(camera, EffectState::Enabled))?;
    let outcome = host.report_batch(vec![
        PlatformReport::background_blur(camera, EffectState::Disabled),
        PlatformReport::background_blur(camera, EffectState::Enabled),
        PlatformReport::background_blur(camera, EffectState::Disabled),
    ])?;
    println!("   batch: {:?}", outcome);

    // Frames carry the state at capture time
    println!("\n4. Capturing frames...");
    for (i, &id) in tracks.iter().enumerate() {
        let raw = RawFrame::new(vec![0u8; 64], CaptureTime::from_frame_index(i as u64, 30));
        if let Some(frame) = host.capture(id, raw)? {
            println!(
                "   track {} frame {:?}: blur {:?}",
                id,
                frame.seq(),
                frame.background_blur().map(|info| info.state)
            );
        }
    }

    println!("\n5. Stats: {:?}", host.stats());
    Ok(())
}

