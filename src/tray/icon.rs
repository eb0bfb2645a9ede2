use anyhow::Result;
use tray_icon::Icon;

const ICON_SIZE: u32 = 32;
const ICON_COLOR: [u8; 4] = [230, 150, 0, 255];

pub fn create_icon() -> Result<Icon> {
    Ok(Icon::from_rgba(render_dot(ICON_SIZE), ICON_SIZE, ICON_SIZE)?)
}

/// Filled circle on a transparent square, RGBA.
fn render_dot(size: u32) -> Vec<u8> {
    let mut data = vec![0u8; (size * size * 4) as usize];
    let radius = (size / 2) as i32 - 2;
    let center = (size / 2) as i32;

    for y in 0..size as i32 {
        for x in 0..size as i32 {
            let dx = x - center;
            let dy = y - center;
            if dx * dx + dy * dy <= radius * radius {
                let idx = ((y as u32 * size + x as u32) * 4) as usize;
                data[idx..idx + 4].copy_from_slice(&ICON_COLOR);
            }
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(data: &[u8], size: u32, x: u32, y: u32) -> &[u8] {
        let idx = ((y * size + x) * 4) as usize;
        &data[idx..idx + 4]
    }

    #[test]
    fn dot_is_opaque_in_the_middle_and_clear_in_the_corners() {
        let data = render_dot(ICON_SIZE);

        assert_eq!(data.len(), (ICON_SIZE * ICON_SIZE * 4) as usize);
        assert_eq!(pixel(&data, ICON_SIZE, ICON_SIZE / 2, ICON_SIZE / 2), ICON_COLOR);
        let edge = ICON_SIZE - 1;
        for (x, y) in [(0, 0), (edge, 0), (0, edge), (edge, edge)] {
            assert_eq!(pixel(&data, ICON_SIZE, x, y), [0, 0, 0, 0], "corner ({}, {})", x, y);
        }
    }
}
