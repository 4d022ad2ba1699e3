use anyhow::{anyhow, Result};
use eframe::egui::{self, TextureHandle, Vec2};
use image::RgbaImage;

pub const WINDOW_TITLE: &str = "GSPRO Button Detection (press q to quit)";

/// Preview window showing a single image until `q` is pressed.
struct PreviewApp {
    image: RgbaImage,
    texture: Option<TextureHandle>,
}

impl PreviewApp {
    fn load_texture(&mut self, ctx: &egui::Context) -> TextureHandle {
        self.texture
            .get_or_insert_with(|| {
                let size = [self.image.width() as usize, self.image.height() as usize];
                let color_image =
                    egui::ColorImage::from_rgba_unmultiplied(size, self.image.as_raw());
                ctx.load_texture("detection_preview", color_image, egui::TextureOptions::NEAREST)
            })
            .clone()
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Q)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        let texture = self.load_texture(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                ui.image((texture.id(), texture.size_vec2()));
            });
    }
}

/// Shows the image in a window sized to the capture region.
/// Blocks until the window is closed.
pub fn show_preview(image: RgbaImage, width: u32, height: u32) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(Vec2::new(width as f32, height as f32))
            .with_title(WINDOW_TITLE),
        ..Default::default()
    };

    log::debug!("Opening debug preview window");

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(|_cc| {
            Ok(Box::new(PreviewApp {
                image,
                texture: None,
            }))
        }),
    )
    .map_err(|e| anyhow!("Preview window error: {}", e))
}
