use image::RgbImage;

use ups_runtime_report::chart::{self, ChartRenderer, ChartStyle};
use ups_runtime_report::fonts;
use ups_runtime_report::runtime_table;

fn count_pixels(image: &RgbImage, predicate: impl Fn([u8; 3]) -> bool) -> usize {
    image.pixels().filter(|pixel| predicate(pixel.0)).count()
}

#[test]
fn labelled_charts_render_for_every_rating() {
    assert!(fonts::install_chart_font(), "bundled chart font should load");
    assert!(chart::labels_enabled());

    let renderer = ChartRenderer::new(ChartStyle::default());
    for dataset in runtime_table().iter() {
        let image = renderer.render(dataset).expect("labelled chart renders");
        assert_eq!(image.dimensions(), (1500, 750));

        // Axis lines and label text are drawn in black.
        let dark = count_pixels(&image, |[r, g, b]| r < 60 && g < 60 && b < 60);
        assert!(dark > 500, "{} kVA chart has no text", dataset.rating());

        let first = dataset.series()[0].color();
        let series = count_pixels(&image, |rgb| rgb == [first.r, first.g, first.b]);
        assert!(series > 0, "{} kVA chart has no series", dataset.rating());
    }
}
