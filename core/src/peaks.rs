//! Local-maximum peak picking with height, spacing and prominence criteria

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakCriteria {
    /// Minimum peak value
    pub min_height: f32,
    /// Peaks closer than this many bins are thinned, tallest first
    pub min_distance: usize,
    /// Minimum height above the higher of the two surrounding minima
    pub min_prominence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    pub index: usize,
    pub height: f32,
}

/// Find peaks in `values`, in ascending index order.
///
/// Criteria are applied in order: height, then distance, then prominence.
pub fn find_peaks(values: &[f32], criteria: &PeakCriteria) -> Vec<Peak> {
    let mut peaks: Vec<usize> = local_maxima(values)
        .into_iter()
        .filter(|&i| values[i] >= criteria.min_height)
        .collect();

    if criteria.min_distance > 1 {
        peaks = select_by_distance(values, &peaks, criteria.min_distance);
    }

    peaks
        .into_iter()
        .filter(|&i| prominence(values, i) >= criteria.min_prominence)
        .map(|index| Peak {
            index,
            height: values[index],
        })
        .collect()
}

/// Indices of samples strictly greater than both neighbours. A flat top
/// reports its middle sample (rounded down).
fn local_maxima(values: &[f32]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if values.len() < 3 {
        return maxima;
    }

    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    maxima
}

/// Drop any peak within `distance` bins of a taller one that was kept
fn select_by_distance(values: &[f32], peaks: &[usize], distance: usize) -> Vec<usize> {
    let mut keep = vec![true; peaks.len()];
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by(|&a, &b| values[peaks[b]].total_cmp(&values[peaks[a]]).then(a.cmp(&b)));

    for &j in &order {
        if !keep[j] {
            continue;
        }
        for k in (0..j).rev() {
            if peaks[j] - peaks[k] >= distance {
                break;
            }
            keep[k] = false;
        }
        for k in j + 1..peaks.len() {
            if peaks[k] - peaks[j] >= distance {
                break;
            }
            keep[k] = false;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}

/// Height of `values[peak]` above the higher of the lowest points reached
/// walking left and right until a taller sample or the edge.
pub fn prominence(values: &[f32], peak: usize) -> f32 {
    let height = values[peak];

    let mut left_min = height;
    for &v in values[..=peak].iter().rev() {
        if v > height {
            break;
        }
        left_min = left_min.min(v);
    }

    let mut right_min = height;
    for &v in &values[peak..] {
        if v > height {
            break;
        }
        right_min = right_min.min(v);
    }

    height - left_min.max(right_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loose() -> PeakCriteria {
        PeakCriteria {
            min_height: f32::NEG_INFINITY,
            min_distance: 1,
            min_prominence: 0.0,
        }
    }

    fn indices(peaks: &[Peak]) -> Vec<usize> {
        peaks.iter().map(|p| p.index).collect()
    }

    #[test]
    fn test_local_maxima() {
        let values = [0.0, 1.0, 0.0, 2.0, 2.0, 2.0, 0.0, 3.0, 3.0, 0.0, 1.0];
        // Plateaus report their middle (rounded down); edges never count
        assert_eq!(local_maxima(&values), vec![1, 4, 7]);
    }

    #[test]
    fn test_plateau_running_into_edge_is_not_a_peak() {
        let values = [0.0, 1.0, 1.0, 1.0];
        assert!(local_maxima(&values).is_empty());
    }

    #[test]
    fn test_height_filter() {
        let values = [0.0, 1.0, 0.0, 5.0, 0.0, 3.0, 0.0];
        let criteria = PeakCriteria {
            min_height: 3.0,
            ..loose()
        };
        let peaks = find_peaks(&values, &criteria);
        assert_eq!(indices(&peaks), vec![3, 5]);
        assert_eq!(peaks[0].height, 5.0);
    }

    #[test]
    fn test_distance_keeps_tallest() {
        let mut values = vec![0.0; 200];
        values[20] = 1.0;
        values[40] = 3.0;
        values[60] = 2.0;
        values[150] = 1.5;
        let criteria = PeakCriteria {
            min_distance: 50,
            ..loose()
        };
        // 40 suppresses 20 and 60; 150 is far enough away
        assert_eq!(indices(&find_peaks(&values, &criteria)), vec![40, 150]);
    }

    #[test]
    fn test_distance_exactly_at_limit_kept() {
        let mut values = vec![0.0; 200];
        values[10] = 2.0;
        values[60] = 1.0;
        let criteria = PeakCriteria {
            min_distance: 50,
            ..loose()
        };
        assert_eq!(indices(&find_peaks(&values, &criteria)), vec![10, 60]);
    }

    #[test]
    fn test_prominence() {
        let values = [0.0, 4.0, 3.0, 3.5, 1.0, 5.0, 0.0];
        assert_eq!(prominence(&values, 1), 4.0 - 1.0);
        assert_eq!(prominence(&values, 3), 3.5 - 3.0);
        assert_eq!(prominence(&values, 5), 5.0);

        let criteria = PeakCriteria {
            min_prominence: 1.0,
            ..loose()
        };
        assert_eq!(indices(&find_peaks(&values, &criteria)), vec![1, 5]);
    }

    #[test]
    fn test_short_input() {
        assert!(find_peaks(&[], &loose()).is_empty());
        assert!(find_peaks(&[1.0, 2.0], &loose()).is_empty());
    }
}
