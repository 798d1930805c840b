use crate::config::SourceConfig;
use rand::{thread_rng, Rng};

const SHADES: &[u8] = b" .:-=+*#%@";

/// Render one image as text, one line per pixel row.
pub fn render_ascii(image: &[u8], num_cols: usize) -> String {
    if num_cols == 0 {
        return String::new();
    }
    let mut out = String::with_capacity(image.len() * 2 + image.len() / num_cols);
    for row in image.chunks(num_cols) {
        for &pixel in row {
            let shade = SHADES[pixel as usize * (SHADES.len() - 1) / 255] as char;
            // doubled so the digit keeps its aspect ratio in a terminal
            out.push(shade);
            out.push(shade);
        }
        out.push('\n');
    }
    out
}

/// Print `count` examples, starting at `index` or at a random position
pub fn preview(
    config: &SourceConfig,
    index: Option<usize>,
    count: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut arena = config.new_arena();
    let dataset = config.load(&mut arena)?;
    let view = dataset.view(&arena)?;

    // images past the last label cannot be shown with one
    let available = view.num_complete();
    if available == 0 {
        return Err("dataset is empty, nothing to preview".into());
    }

    let start = match index {
        Some(i) if i >= available => {
            return Err(format!(
                "index {} out of range, dataset has {} labelled examples",
                i, available
            )
            .into())
        }
        Some(i) => i,
        None => thread_rng().gen_range(0..available),
    };

    for i in (start..available).take(count) {
        println!("Example {} / {}, label {}", i, view.num_items(), view.label(i));
        print!("{}", render_ascii(view.image(i), view.num_cols()));
    }

    Ok(())
}
