/// Scene baker: generates the demo geometry and texture pyramids and
/// writes them out in the viewer's binary scene format.
use std::path::PathBuf;
use std::process;

use rand::rngs::StdRng;
use rand::SeedableRng;
use softraster::scene::demo;

fn main() {
    let mut args = std::env::args().skip(1);
    let output = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data.bin"));
    let seed = match args.next() {
        Some(raw) => match raw.parse::<u64>() {
            Ok(seed) => seed,
            Err(_) => {
                eprintln!("usage: bake-scene [output.bin] [seed]");
                process::exit(2);
            }
        },
        None => 0,
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let scene = demo::build_demo_scene(&mut rng);
    let bytes = demo::serialize(&scene);

    if let Err(err) = std::fs::write(&output, &bytes) {
        eprintln!("failed to write {}: {err}", output.display());
        process::exit(1);
    }
    println!(
        "wrote {} ({} vertices, {} triangles, {} textures, {} bytes)",
        output.display(),
        scene.vertices.len(),
        scene.triangle_count(),
        scene.texture_count(),
        bytes.len()
    );
}
