//! Tests for basis function rendering
//!
//! - Mosaic layout, borders and per-tile normalization
//! - PNG output size and intensities
//! - Snapshot observer cadence

use approx::assert_relative_eq;
use ndarray::{array, Array2};
use sparse_coding::config::TrainingConfig;
use sparse_coding::data::ImageCollection;
use sparse_coding::dictionary::Dictionary;
use sparse_coding::trainer::{DictionaryTrainer, TrainingObserver};
use sparse_coding::utils::SimpleRng;
use sparse_coding::visualize::{
    basis_tile, render_mosaic, resize_nearest, save_dictionary_png, to_gray8, Observers,
    ProgressLogger, SnapshotWriter,
};
use tempfile::tempdir;

/// Two 2×2 basis functions: a ramp and its negation.
fn ramp_dictionary() -> Dictionary {
    Dictionary::from_matrix(
        2,
        array![[1.0, -1.0], [2.0, -2.0], [3.0, -3.0], [4.0, -4.0]],
    )
    .unwrap()
}

// ============================================================================
// Mosaic Tests
// ============================================================================

mod mosaic_tests {
    use super::*;

    #[test]
    fn test_tile_orientation() {
        let tile = basis_tile(&ramp_dictionary(), 0);
        let scale = tile[[0, 0]];

        // entry c * p + r lands at (r, c)
        assert_relative_eq!(tile[[1, 0]], 2.0 * scale, epsilon = 1e-12);
        assert_relative_eq!(tile[[0, 1]], 3.0 * scale, epsilon = 1e-12);
        assert_relative_eq!(tile[[1, 1]], 4.0 * scale, epsilon = 1e-12);
    }

    #[test]
    fn test_mosaic_layout() {
        let mosaic = render_mosaic(&ramp_dictionary(), 1);

        // two tiles need a 2×2 grid: 1 + 2 * (2 + 1)
        assert_eq!(mosaic.dim(), (7, 7));

        assert_relative_eq!(mosaic[[1, 1]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(mosaic[[2, 1]], 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(mosaic[[1, 2]], 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(mosaic[[2, 2]], 1.0, epsilon = 1e-12);

        // negated ramp: brightest where the first tile is darkest
        assert_relative_eq!(mosaic[[1, 4]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(mosaic[[2, 5]], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_borders_and_unused_cells_are_black() {
        let mosaic = render_mosaic(&ramp_dictionary(), 1);

        for i in 0..7 {
            assert_eq!(mosaic[[0, i]], 0.0);
            assert_eq!(mosaic[[i, 0]], 0.0);
            assert_eq!(mosaic[[3, i]], 0.0);
            assert_eq!(mosaic[[i, 3]], 0.0);
        }
        assert!(mosaic.slice(ndarray::s![4..6, ..]).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_mosaic_values_in_unit_range() {
        let mut rng = SimpleRng::new(12);
        let dictionary = Dictionary::random(4, 10, &mut rng).unwrap();
        let mosaic = render_mosaic(&dictionary, 2);

        // 10 tiles need a 4×4 grid: 2 + 4 * (4 + 2)
        assert_eq!(mosaic.dim(), (26, 26));
        assert!(mosaic.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn test_zero_border() {
        let mosaic = render_mosaic(&ramp_dictionary(), 0);
        assert_eq!(mosaic.dim(), (4, 4));
        assert_relative_eq!(mosaic[[1, 1]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(mosaic[[0, 2]], 1.0, epsilon = 1e-12);
    }
}

// ============================================================================
// Image Output Tests
// ============================================================================

mod output_tests {
    use super::*;

    #[test]
    fn test_resize_nearest_repeats_pixels() {
        let gray = to_gray8(&array![[0.0, 1.0], [1.0, 0.0]]);
        let resized = resize_nearest(&gray, 4);

        assert_eq!(resized.dimensions(), (4, 4));
        assert_eq!(resized.get_pixel(0, 0)[0], 0);
        assert_eq!(resized.get_pixel(3, 0)[0], 255);
        assert_eq!(resized.get_pixel(0, 3)[0], 255);
        assert_eq!(resized.get_pixel(3, 3)[0], 0);
    }

    #[test]
    fn test_save_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("basis.png");

        save_dictionary_png(&ramp_dictionary(), &path, 1, 70).unwrap();

        let image = image::open(&path).unwrap().to_luma8();
        assert_eq!(image.dimensions(), (70, 70));
        // top-left corner is border
        assert_eq!(image.get_pixel(0, 0)[0], 0);
        // brightest pixel of the first tile
        assert_eq!(image.get_pixel(25, 25)[0], 255);
    }

    #[test]
    fn test_save_png_bad_path_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("basis.png");
        assert!(save_dictionary_png(&ramp_dictionary(), &path, 1, 10).is_err());
    }

    #[test]
    fn test_gray8_rounding() {
        let gray = to_gray8(&Array2::from_elem((1, 1), 0.5));
        assert_eq!(gray.get_pixel(0, 0)[0], 128);
    }
}

// ============================================================================
// Observer Tests
// ============================================================================

mod observer_tests {
    use super::*;

    fn trainer() -> DictionaryTrainer {
        let mut rng = SimpleRng::new(40);
        let images = ImageCollection::new(vec![Array2::from_shape_simple_fn((8, 8), || {
            rng.gen_range_f64(0.0, 4.0)
        })])
        .unwrap();
        let config = TrainingConfig {
            basis_function_count: 4,
            patch_size: 2,
            sample_count: 5,
            ..TrainingConfig::default()
        };
        DictionaryTrainer::new(images, &config, SimpleRng::new(3)).unwrap()
    }

    #[test]
    fn test_snapshot_every_two_iterations() {
        let dir = tempdir().unwrap();
        let mut writer = SnapshotWriter::new(dir.path().join("snaps"), 2, 1, 20).unwrap();

        trainer().train(4, &mut writer).unwrap();

        let names: Vec<String> = writer
            .written()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["snapshot_00002.png", "snapshot_00004.png"]);
        assert!(writer.written().iter().all(|p| p.exists()));
    }

    #[test]
    fn test_snapshot_written_on_final_iteration() {
        let dir = tempdir().unwrap();
        let mut writer = SnapshotWriter::new(dir.path(), 10, 1, 20).unwrap();

        trainer().train(3, &mut writer).unwrap();

        assert_eq!(writer.written().len(), 1);
        assert!(writer.written()[0].ends_with("snapshot_00003.png"));
    }

    #[test]
    fn test_observers_fan_out() {
        let dir = tempdir().unwrap();
        let mut writer = SnapshotWriter::new(dir.path(), 1, 1, 10).unwrap();
        let mut logger = ProgressLogger::new(1);
        let mut count = 0;
        let mut counter = |_: &sparse_coding::trainer::IterationSnapshot<'_>| count += 1;

        {
            let observers: Vec<&mut dyn TrainingObserver> =
                vec![&mut writer, &mut logger, &mut counter];
            trainer().train(3, &mut Observers(observers)).unwrap();
        }

        assert_eq!(count, 3);
        assert_eq!(writer.written().len(), 3);
    }
}
