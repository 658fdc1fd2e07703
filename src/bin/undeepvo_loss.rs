// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use env_logger::Env;
use log::{info, warn};
use std::{env, error::Error, path::PathBuf};

use undeepvo_rs::config::Config;
use undeepvo_rs::core::calibration::CamerasCalibration;
use undeepvo_rs::core::criterion::UnsupervisedCriterion;
use undeepvo_rs::core::image::Image;
use undeepvo_rs::core::losses::spatial::LossWeights;
use undeepvo_rs::core::result::ResultDataPoint;
use undeepvo_rs::dataset::ground_truth::GroundTruthDataset;
use undeepvo_rs::math::so3;
use undeepvo_rs::misc::type_aliases::{Iso3, Map};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args: Vec<String> = env::args().collect();
    if let Err(error) = run(&args) {
        eprintln!("{:?}", error);
        std::process::exit(1);
    }
}

const USAGE: &str = "Usage: ./undeepvo_loss config.json index_file";

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    // Check that the arguments are correct.
    let valid_args = check_args(args)?;

    // Setup the criterion.
    let config = Config::from_json_file(&valid_args.config_file_path)?;
    let calibration = CamerasCalibration::from(&config.calibration);
    let criterion =
        UnsupervisedCriterion::with_weights(&calibration, LossWeights::from(config.weights));
    let left_to_right = calibration.transform_from_left_to_right;

    // Ground truth depth and poses play the role of predictions.
    let dataset = GroundTruthDataset::open(&valid_args.index_file_path, config.depth_scale)?;
    if dataset.len() < 2 {
        warn!("Less than two frames, nothing to evaluate");
        return Ok(());
    }

    let mut current = read_stereo(&dataset, 0, 1, &left_to_right)?;
    for index in 0..dataset.len() - 1 {
        let (left_current, right_current) = current;
        let (left_next, right_next) = read_stereo(&dataset, index + 1, index, &left_to_right)?;
        let output = criterion.evaluate(&left_current, &right_current, &left_next, &right_next)?;
        println!(
            "{} {} {} {} {} {}",
            index, output.total, output.photometric, output.disparity, output.pose, output.temporal
        );

        // The next frame becomes the current one, now moving forward in time.
        current = if index + 2 < dataset.len() {
            let forward = dataset.relative_motion(index + 1, index + 2)?;
            (
                with_motion(left_next, &forward),
                with_motion(right_next, &right_motion(&left_to_right, &forward)),
            )
        } else {
            (left_next, right_next)
        };
    }
    info!("Evaluated {} frame pairs", dataset.len() - 1);

    Ok(())
}

struct Args {
    config_file_path: PathBuf,
    index_file_path: PathBuf,
}

/// Verify that command line arguments are correct.
fn check_args(args: &[String]) -> Result<Args, String> {
    if let [_, config_file_path_str, index_file_path_str] = args {
        let config_file_path = PathBuf::from(config_file_path_str);
        let index_file_path = PathBuf::from(index_file_path_str);
        for path in &[&config_file_path, &index_file_path] {
            if !path.is_file() {
                eprintln!("{}", USAGE);
                return Err(format!(
                    "The file does not exist or is not reachable: {}",
                    path.display()
                ));
            }
        }
        Ok(Args {
            config_file_path,
            index_file_path,
        })
    } else {
        eprintln!("{}", USAGE);
        Err("Wrong number of arguments".to_string())
    }
}

/// Bundles of the left and right cameras of frame `index`,
/// with the ground truth motion towards frame `other`.
fn read_stereo(
    dataset: &GroundTruthDataset,
    index: usize,
    other: usize,
    left_to_right: &Iso3,
) -> Result<(ResultDataPoint, ResultDataPoint), Box<dyn Error>> {
    let depth = fill_holes(dataset.read_depth(index)?);
    let motion = dataset.relative_motion(index, other)?;
    let left = bundle(dataset.read_left_image(index)?, depth.clone(), &motion);
    // Rectified rig: the left depth stands in for the right one.
    let right = bundle(
        dataset.read_right_image(index)?,
        depth,
        &right_motion(left_to_right, &motion),
    );
    Ok((left, right))
}

fn bundle(image: Image, depth: Map, motion: &Iso3) -> ResultDataPoint {
    ResultDataPoint::new(
        image,
        depth,
        motion.translation.vector,
        so3::log(motion.rotation),
    )
}

fn with_motion(data_point: ResultDataPoint, motion: &Iso3) -> ResultDataPoint {
    ResultDataPoint {
        translation: motion.translation.vector,
        rotation: so3::log(motion.rotation),
        ..data_point
    }
}

/// Motion of the right camera given the motion of the left camera.
fn right_motion(left_to_right: &Iso3, left_motion: &Iso3) -> Iso3 {
    left_to_right * left_motion * left_to_right.inverse()
}

/// Sparse ground truth depth has zeros where nothing was measured.
/// Those are replaced by the mean of measured depths.
fn fill_holes(depth: Map) -> Map {
    let (sum, count) = depth
        .iter()
        .filter(|&&d| d > 0.0)
        .fold((0.0, 0usize), |(sum, count), d| (sum + d, count + 1));
    let fill = if count > 0 { sum / count as f32 } else { 1.0 };
    depth.map(|d| if d > 0.0 { d } else { fill })
}
