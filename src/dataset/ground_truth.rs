// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Stereo sequences with ground truth depth and poses.
//!
//! A sequence is described by an index file where each line is either
//! a comment starting with `#` or a frame:
//!
//! `timestamp left_image right_image depth_image tx ty tz qx qy qz qw`
//!
//! Image paths are relative to the index file.
//! Depth images are 16 bits gray png files, scaled by a depth scale
//! (256 for KITTI depth maps), 0 meaning unknown.
//! The pose is the camera to world transform of the left camera.

use log::{debug, info};
use nalgebra as na;
use std::path::{Path, PathBuf};

use crate::core::image::Image;
use crate::dataset::DatasetError;
use crate::misc::type_aliases::{Float, Iso3, Map};
use crate::misc::{helper, interop};

/// U16 depth values are scaled for better precision.
/// So 256 in the 16 bits gray png corresponds to 1 meter.
pub const DEPTH_SCALE_KITTI: Float = 256.0;

/// Paths and pose of one stereo frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub timestamp: f64,
    pub left_image: PathBuf,
    pub right_image: PathBuf,
    pub depth_image: PathBuf,
    /// Pose (camera to world rigid body motion) of the left camera.
    pub pose: Iso3,
}

/// A sequence of stereo frames with ground truth depth and poses.
#[derive(Debug, Clone)]
pub struct GroundTruthDataset {
    frames: Vec<Frame>,
    depth_scale: Float,
    image_size: (usize, usize),
}

impl GroundTruthDataset {
    /// Read a sequence from its index file.
    /// The image size is read from the first left image.
    pub fn open<P: AsRef<Path>>(index_path: P, depth_scale: Float) -> Result<Self, DatasetError> {
        let index_path = index_path.as_ref();
        let content = std::fs::read_to_string(index_path)?;
        let parent = index_path.parent().unwrap_or_else(|| Path::new(""));
        let frames: Vec<Frame> = parse::index(&content)?
            .into_iter()
            .map(|frame| abs_paths(parent, frame))
            .collect();
        let image_size = match frames.first() {
            Some(frame) => {
                let (width, height) = image::image_dimensions(&frame.left_image)?;
                (height as usize, width as usize)
            }
            None => (0, 0),
        };
        info!(
            "Opened {} with {} frames of size {:?}",
            index_path.display(),
            frames.len(),
            image_size
        );
        Ok(Self::from_frames(frames, depth_scale, image_size))
    }

    /// Sequence from frames already in memory, with a known `(height, width)` image size.
    pub fn from_frames(frames: Vec<Frame>, depth_scale: Float, image_size: (usize, usize)) -> Self {
        Self {
            frames,
            depth_scale,
            image_size,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// `(height, width)` of the images.
    pub fn get_image_size(&self) -> (usize, usize) {
        self.image_size
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Result<&Frame, DatasetError> {
        self.frames.get(index).ok_or(DatasetError::IndexOutOfBounds {
            index,
            len: self.frames.len(),
        })
    }

    pub fn read_left_image(&self, index: usize) -> Result<Image, DatasetError> {
        read_rgb(&self.frame(index)?.left_image)
    }

    pub fn read_right_image(&self, index: usize) -> Result<Image, DatasetError> {
        read_rgb(&self.frame(index)?.right_image)
    }

    /// Read the depth map (in meters) of the left camera.
    pub fn read_depth(&self, index: usize) -> Result<Map, DatasetError> {
        let path = &self.frame(index)?.depth_image;
        debug!("Reading depth {}", path.display());
        let (w, h, buffer) = helper::read_png_16bits(path)?;
        Ok(interop::depth_from_u16(w, h, &buffer, self.depth_scale))
    }

    /// Rigid motion mapping left camera coordinates of frame `from`
    /// into left camera coordinates of frame `to`.
    pub fn relative_motion(&self, from: usize, to: usize) -> Result<Iso3, DatasetError> {
        Ok(self.frame(to)?.pose.inverse() * self.frame(from)?.pose)
    }
}

fn read_rgb(path: &Path) -> Result<Image, DatasetError> {
    debug!("Reading image {}", path.display());
    let img = image::open(path)?.to_rgb8();
    Ok(interop::image_from_rgb(&img))
}

/// Transform relative images file paths into absolute ones.
fn abs_paths(parent: &Path, frame: Frame) -> Frame {
    Frame {
        left_image: parent.join(&frame.left_image),
        right_image: parent.join(&frame.right_image),
        depth_image: parent.join(&frame.depth_image),
        ..frame
    }
}

/// Parse index files of stereo sequences.
pub mod parse {
    use super::*;
    use nom::{
        bytes::complete::is_not,
        character::complete::space1,
        combinator::{all_consuming, map},
        number::complete::{double, float},
        sequence::{preceded, tuple},
        IResult,
    };

    /// Parse an index file into a vector of `Frame`.
    /// Empty lines and lines starting with `#` are skipped.
    pub fn index(file_content: &str) -> Result<Vec<Frame>, DatasetError> {
        let mut frames = Vec::new();
        for (line_number, line) in file_content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match all_consuming(frame)(line) {
                Ok((_, data)) => frames.push(data),
                Err(_) => return Err(DatasetError::Parse { line: line_number + 1 }),
            }
        }
        Ok(frames)
    }

    // nom parsers #############################################################

    fn frame(input: &str) -> IResult<&str, Frame> {
        let (input, (timestamp, left_image, right_image, depth_image, pose)) = tuple((
            double,
            preceded(space1, path),
            preceded(space1, path),
            preceded(space1, path),
            preceded(space1, pose),
        ))(input)?;
        Ok((
            input,
            Frame {
                timestamp,
                left_image,
                right_image,
                depth_image,
                pose,
            },
        ))
    }

    fn path(input: &str) -> IResult<&str, PathBuf> {
        map(is_not(" \t\r\n"), |s: &str| PathBuf::from(s))(input)
    }

    fn value(input: &str) -> IResult<&str, Float> {
        preceded(space1, float)(input)
    }

    // Translation followed by the components of a unit quaternion.
    fn pose(input: &str) -> IResult<&str, Iso3> {
        let (input, (tx, ty, tz, qx, qy, qz, qw)) =
            tuple((float, value, value, value, value, value, value))(input)?;
        let translation = na::Translation3::new(tx, ty, tz);
        let rotation = na::UnitQuaternion::from_quaternion(na::Quaternion::new(qw, qx, qy, qz));
        Ok((input, Iso3::from_parts(translation, rotation)))
    }
} // pub mod parse

#[cfg(test)]
mod tests {
    use super::*;
    use crate::misc::type_aliases::Vec3;
    use approx::assert_relative_eq;

    const INDEX: &str = "# timestamp left right depth tx ty tz qx qy qz qw
0.0 left/0.png right/0.png depth/0.png 0 0 0 0 0 0 1
0.1 left/1.png right/1.png depth/1.png 0.0 0.0 1.5 0 0 0 1

0.2\tleft/2.png right/2.png depth/2.png 1 2 3 0 0 0.7071068 0.7071068
";

    #[test]
    fn parse_index() {
        let frames = parse::index(INDEX).unwrap();
        assert_eq!(3, frames.len());
        assert_eq!(PathBuf::from("right/1.png"), frames[1].right_image);
        assert_eq!(Vec3::new(0.0, 0.0, 1.5), frames[1].pose.translation.vector);
        assert_relative_eq!(0.2, frames[2].timestamp);
        assert_relative_eq!(
            std::f32::consts::FRAC_PI_2,
            frames[2].pose.rotation.angle(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn parse_error_reports_line() {
        let content = "# comment\n0.0 a.png b.png c.png 0 0 0 0 0 0 1\n0.1 a.png b.png\n";
        assert!(matches!(
            parse::index(content),
            Err(DatasetError::Parse { line: 3 })
        ));
    }

    #[test]
    fn relative_motion_between_frames() {
        let frames = parse::index(INDEX).unwrap();
        let dataset = GroundTruthDataset::from_frames(frames, DEPTH_SCALE_KITTI, (4, 6));
        // The camera moves forward by 1.5, so a point at depth 2 ends up at depth 0.5.
        let motion = dataset.relative_motion(0, 1).unwrap();
        let moved = motion * na::Point3::new(0.0, 0.0, 2.0);
        assert_relative_eq!(0.5, moved.z, epsilon = 1e-6);
        assert!(dataset.relative_motion(0, 3).is_err());
    }

    #[test]
    fn open_makes_paths_absolute() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbImage::new(6, 4)
            .save(dir.path().join("l.png"))
            .unwrap();
        let index_path = dir.path().join("index.txt");
        std::fs::write(&index_path, "0 l.png r.png d.png 0 0 0 0 0 0 1\n").unwrap();
        let dataset = GroundTruthDataset::open(&index_path, DEPTH_SCALE_KITTI).unwrap();
        assert_eq!((4, 6), dataset.get_image_size());
        assert_eq!(dir.path().join("d.png"), dataset.frame(0).unwrap().depth_image);
    }
}
