use lazy_static::lazy_static;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error in line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Invalid format: {0}")]
    Format(String),
}

/// Immutable problem data: point coordinates, per-point service costs and the
/// full matrix of rounded Euclidean distances.
#[derive(Debug, Clone)]
pub struct Instance {
    pub name: String,
    size: usize,
    pub coordinates: Vec<(i64, i64)>,
    costs: Vec<i32>,
    distances: Vec<Vec<i32>>,
    candidates: Vec<Vec<usize>>,
}

impl Instance {
    /// Reads a semicolon-delimited instance file with one `x;y;cost` record
    /// per line. The number of points is the line count.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, InstanceError> {
        lazy_static! {
            static ref RECORD_RE: Regex =
                Regex::new(r"^\s*(-?\d+)\s*;\s*(-?\d+)\s*;\s*(\d+)\s*(?:;.*)?$").unwrap();
        }

        let path = path.as_ref();
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut coordinates = Vec::new();
        let mut costs = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let caps = RECORD_RE.captures(line).ok_or_else(|| InstanceError::Parse {
                line: line_no + 1,
                message: format!("expected `x;y;cost`, got `{}`", line),
            })?;
            let x = caps[1].parse::<i64>().map_err(|e| InstanceError::Parse {
                line: line_no + 1,
                message: format!("failed to parse x coordinate: {}", e),
            })?;
            let y = caps[2].parse::<i64>().map_err(|e| InstanceError::Parse {
                line: line_no + 1,
                message: format!("failed to parse y coordinate: {}", e),
            })?;
            let cost = caps[3].parse::<i32>().map_err(|e| InstanceError::Parse {
                line: line_no + 1,
                message: format!("failed to parse cost: {}", e),
            })?;
            coordinates.push((x, y));
            costs.push(cost);
        }

        if coordinates.is_empty() {
            return Err(InstanceError::Format("no records found".to_string()));
        }

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("instance")
            .to_string();

        Ok(Self::from_parts(name, coordinates, costs))
    }

    /// Builds an instance directly from coordinates and costs.
    pub fn from_parts(name: String, coordinates: Vec<(i64, i64)>, costs: Vec<i32>) -> Self {
        let size = coordinates.len();
        let mut instance = Self {
            name,
            size,
            coordinates,
            costs,
            distances: vec![vec![0; size]; size],
            candidates: vec![Vec::new(); size],
        };
        instance.calculate_distance_matrix();
        instance
    }

    fn calculate_distance_matrix(&mut self) {
        for i in 0..self.size {
            for j in 0..self.size {
                self.distances[i][j] = self.calculate_distance(i, j);
            }
        }
    }

    fn calculate_distance(&self, i: usize, j: usize) -> i32 {
        if i == j {
            return 0;
        }
        let (x1, y1) = self.coordinates[i];
        let (x2, y2) = self.coordinates[j];
        let dx = (x2 - x1) as f64;
        let dy = (y2 - y1) as f64;
        (dx * dx + dy * dy).sqrt().round() as i32
    }

    pub fn distance(&self, i: usize, j: usize) -> i32 {
        self.distances[i][j]
    }

    pub fn cost(&self, i: usize) -> i32 {
        self.costs[i]
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of points a solution must cover: ⌈size · fraction⌉, at least 1.
    pub fn select_count(&self, fraction: f64) -> usize {
        ((self.size as f64 * fraction).ceil() as usize).clamp(1, self.size)
    }

    /// Precomputes, for every point u, the `m` other points minimizing
    /// `dist(u, v) + cost(v)`. The lists are consumed by the candidate search.
    pub fn precompute_candidates(&mut self, m: usize) {
        if m == 0 || m >= self.size {
            log::warn!(
                "candidate list size {} out of range for instance of {} points, lists left empty",
                m,
                self.size
            );
            self.candidates = vec![Vec::new(); self.size];
            return;
        }
        if self.candidates[0].len() == m {
            return;
        }

        self.candidates = Vec::with_capacity(self.size);
        for u in 0..self.size {
            let mut order: Vec<usize> = (0..self.size).filter(|&v| v != u).collect();
            order.sort_unstable_by_key(|&v| self.distances[u][v] + self.costs[v]);
            order.truncate(m);
            self.candidates.push(order);
        }
    }

    /// The precomputed candidate list of a point; empty when no
    /// precomputation happened.
    pub fn candidates(&self, node: usize) -> &[usize] {
        &self.candidates[node]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn square() -> Instance {
        Instance::from_parts(
            "square".to_string(),
            vec![(0, 0), (3, 0), (3, 4), (0, 4)],
            vec![0, 0, 0, 0],
        )
    }

    #[test]
    fn distances_are_rounded_and_symmetric() {
        let instance = square();
        assert_eq!(instance.distance(0, 1), 3);
        assert_eq!(instance.distance(1, 2), 4);
        assert_eq!(instance.distance(0, 2), 5);
        for i in 0..4 {
            assert_eq!(instance.distance(i, i), 0);
            for j in 0..4 {
                assert_eq!(instance.distance(i, j), instance.distance(j, i));
            }
        }
    }

    #[test]
    fn select_count_rounds_up() {
        let instance = square();
        assert_eq!(instance.select_count(0.5), 2);
        let odd = Instance::from_parts(
            "odd".to_string(),
            vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)],
            vec![0; 5],
        );
        assert_eq!(odd.select_count(0.5), 3);
        assert_eq!(odd.select_count(1.0), 5);
    }

    #[test]
    fn parses_semicolon_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0;0;10").unwrap();
        writeln!(file, "3;0;20").unwrap();
        writeln!(file, "3;4;30").unwrap();
        file.flush().unwrap();

        let instance = Instance::from_file(file.path()).unwrap();
        assert_eq!(instance.size(), 3);
        assert_eq!(instance.cost(0), 10);
        assert_eq!(instance.cost(2), 30);
        assert_eq!(instance.distance(0, 2), 5);
    }

    #[test]
    fn reports_malformed_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "0;0;10").unwrap();
        writeln!(file, "not a record").unwrap();
        file.flush().unwrap();

        match Instance::from_file(file.path()) {
            Err(InstanceError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn candidates_ordered_by_distance_plus_cost() {
        let mut instance = Instance::from_parts(
            "weighted".to_string(),
            vec![(0, 0), (1, 0), (2, 0), (10, 0)],
            vec![0, 100, 0, 0],
        );
        instance.precompute_candidates(2);
        // From node 0: node 1 is nearest by distance but its cost pushes it
        // behind nodes 2 and 3.
        assert_eq!(instance.candidates(0), &[2, 3]);
    }

    #[test]
    fn zero_candidate_size_leaves_lists_empty() {
        let mut instance = square();
        instance.precompute_candidates(0);
        assert!(instance.candidates(0).is_empty());
    }
}
