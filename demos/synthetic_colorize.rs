use colorize_core::{PointCloud, Rgb};
use colorize_io::{format_record, RecordStyle};
use colorize_transfer::{colorize_clouds, ColorizeParams};

fn main() {
    // A dense uncolored "laser" cloud: 1000 random-ish points
    let n = 1000;
    let x: Vec<f64> = (0..n).map(|i| (i as f64 * 0.731) % 10.0).collect();
    let y: Vec<f64> = (0..n).map(|i| (i as f64 * 0.419) % 10.0).collect();
    let z: Vec<f64> = (0..n).map(|i| (i as f64 * 0.257) % 10.0).collect();
    let laser = PointCloud::from_xyz(x, y, z);
    println!("Laser cloud: {} points", laser.len());

    // A sparse "camera" cloud covering only x < 5, colored by height
    let mut camera = PointCloud::new_colored();
    for i in 0..200 {
        let p = [
            (i as f64 * 0.377) % 5.0,
            (i as f64 * 0.613) % 10.0,
            (i as f64 * 0.291) % 10.0,
        ];
        let shade = (p[2] * 25.5) as u8;
        camera.push_rgb(p, Rgb::new(shade, 64, 255 - shade));
    }
    println!("Camera cloud: {} points", camera.len());

    let params = ColorizeParams::default()
        .with_max_distance(1.0)
        .with_default_color(Rgb::WHITE);
    let result = match colorize_clouds(&laser, &camera, params) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("colorize failed: {e}");
            return;
        }
    };

    let s = result.summary;
    println!(
        "Matched {} points, {} beyond 1.0, {} without neighbor",
        s.matched, s.beyond_threshold, s.no_neighbor
    );
    for record in result.records.iter().take(5) {
        println!("{}", format_record(record, RecordStyle::Aligned));
    }
}
