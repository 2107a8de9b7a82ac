use crate::models::{JobSalary, SalaryExpectation, SalaryUnit};

/// Score when either side's salary is unknown
pub const NEUTRAL_SALARY_SCORE: u8 = 50;

/// Closed salary interval
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
}

impl SalaryRange {
    /// Build a range, swapping bounds given in the wrong order
    pub fn new(a: f64, b: f64) -> Option<Self> {
        if !a.is_finite() || !b.is_finite() || a < 0.0 || b < 0.0 {
            return None;
        }
        Some(Self {
            min: a.min(b),
            max: a.max(b),
        })
    }

    /// Range from optional bounds: a lone minimum is open-ended up to 2x,
    /// a lone maximum starts at zero
    pub fn from_bounds(min: Option<f64>, max: Option<f64>) -> Option<Self> {
        let min = min.filter(|v| *v > 0.0);
        let max = max.filter(|v| *v > 0.0);

        match (min, max) {
            (Some(min), Some(max)) => Self::new(min, max),
            (Some(min), None) => Self::new(min, min * 2.0),
            (None, Some(max)) => Self::new(0.0, max),
            (None, None) => None,
        }
    }

    pub fn scale(self, factor: f64) -> Self {
        Self {
            min: self.min * factor,
            max: self.max * factor,
        }
    }
}

/// Parse a free-text salary
///
/// Accepted forms:
/// - `"min-max"` → `(min, max)`
/// - `"N+"` → `(N, 2N)`
/// - `"<N"` → `(0, N)`
/// - `"N"` → `(0.8N, 1.2N)`
///
/// Currency marks, thousands separators, a `k` suffix and a trailing
/// `/day`-style unit are tolerated. Anything else yields `None`.
pub fn parse_salary(text: &str) -> Option<SalaryRange> {
    parse_salary_with_unit(text).map(|(range, _)| range)
}

/// Parse a free-text salary along with the pay period it names, if any
///
/// The unit is read from a `/unit` suffix (`"₱500/day"`) or a trailing
/// word (`"500 daily"`, `"15k per month"`).
pub fn parse_salary_with_unit(text: &str) -> Option<(SalaryRange, Option<SalaryUnit>)> {
    let lowered = text.trim().to_lowercase();
    let (body, unit) = split_unit(&lowered);
    Some((parse_range(body)?, unit))
}

fn split_unit(text: &str) -> (&str, Option<SalaryUnit>) {
    if let Some((body, label)) = text.split_once('/') {
        return (body, SalaryUnit::from_label(label));
    }

    match text.rsplit_once(char::is_whitespace) {
        Some((body, word)) => match SalaryUnit::from_label(word) {
            Some(unit) => {
                let body = body.trim_end();
                (body.strip_suffix("per").unwrap_or(body), Some(unit))
            }
            None => (text, None),
        },
        None => (text, None),
    }
}

fn parse_range(text: &str) -> Option<SalaryRange> {
    let body = text
        .replace("php", "")
        .replace(['₱', ',', ' '], "")
        .replace(['–', '—'], "-")
        .trim_start_matches('p')
        .to_string();

    if body.is_empty() {
        return None;
    }

    if let Some(rest) = body.strip_prefix('<') {
        let max = parse_amount(rest)?;
        return SalaryRange::new(0.0, max);
    }

    if let Some(rest) = body.strip_suffix('+') {
        let min = parse_amount(rest)?;
        return SalaryRange::new(min, min * 2.0);
    }

    if let Some((low, high)) = body.split_once('-') {
        return SalaryRange::new(parse_amount(low)?, parse_amount(high)?);
    }

    let amount = parse_amount(&body)?;
    SalaryRange::new(amount * 0.8, amount * 1.2)
}

/// Number with an optional thousands suffix
fn parse_amount(text: &str) -> Option<f64> {
    let text = text.trim_start_matches('p');
    let (digits, factor) = match text.strip_suffix('k') {
        Some(digits) => (digits, 1000.0),
        None => (text, 1.0),
    };

    digits
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v * factor)
}

/// Salary range a posting offers, with the unit its text names
pub fn job_range_with_unit(salary: &JobSalary) -> Option<(SalaryRange, Option<SalaryUnit>)> {
    match salary {
        JobSalary::Text(text) => parse_salary_with_unit(text),
        JobSalary::Range { min, max } => SalaryRange::from_bounds(*min, *max).map(|r| (r, None)),
    }
}

/// Salary range a worker is asking for
pub fn expectation_range(expectation: &SalaryExpectation) -> Option<SalaryRange> {
    SalaryRange::from_bounds(expectation.min, expectation.max)
}

/// Score a job's salary against the worker's expectation (0-100)
///
/// The job's pay period is `job_unit`, or else the unit its salary text
/// names. When known, the job range is converted to the worker's pay
/// period before comparing.
pub fn score_salary(
    expectation: Option<&SalaryExpectation>,
    salary: Option<&JobSalary>,
    job_unit: Option<SalaryUnit>,
) -> u8 {
    let Some(expectation) = expectation else {
        return NEUTRAL_SALARY_SCORE;
    };
    let (Some(worker), Some((job, text_unit))) = (
        expectation_range(expectation),
        salary.and_then(job_range_with_unit),
    ) else {
        return NEUTRAL_SALARY_SCORE;
    };

    let job = match job_unit.or(text_unit) {
        Some(unit) if unit != expectation.unit => {
            job.scale(unit.per_month() / expectation.unit.per_month())
        }
        _ => job,
    };

    compare_ranges(&worker, &job)
}

/// Compare an offered range against an expected range (0-100)
pub fn compare_ranges(worker: &SalaryRange, job: &SalaryRange) -> u8 {
    if job.min >= worker.min && job.max <= worker.max {
        return 100;
    }

    // a single expected figure is met by any range that includes it
    if worker.min == worker.max && job.min <= worker.min && job.max >= worker.max {
        return 100;
    }

    let overlap = job.max.min(worker.max) - job.min.max(worker.min);
    if overlap > 0.0 {
        let union = job.max.max(worker.max) - job.min.min(worker.min);
        return clamp_score(100.0 * overlap / union);
    }

    let job_below = job.max <= worker.min;
    let gap = if job_below {
        worker.min - job.max
    } else {
        job.min - worker.max
    };
    let threshold = (worker.min * 0.2).max(100.0);

    if gap <= threshold {
        clamp_score(80.0 - 10.0 * gap / threshold)
    } else if job_below {
        30
    } else {
        40
    }
}

#[inline]
fn clamp_score(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: f64, max: f64) -> SalaryRange {
        SalaryRange::new(min, max).unwrap()
    }

    #[test]
    fn parses_supported_forms() {
        assert_eq!(parse_salary("300-500"), Some(range(300.0, 500.0)));
        assert_eq!(parse_salary("₱15,000 - ₱18,000"), Some(range(15000.0, 18000.0)));
        assert_eq!(parse_salary("500+"), Some(range(500.0, 1000.0)));
        assert_eq!(parse_salary("<800"), Some(range(0.0, 800.0)));
        assert_eq!(parse_salary("12k"), Some(range(9600.0, 14400.0)));
        assert_eq!(parse_salary("PHP 400/day"), Some(range(320.0, 480.0)));
        assert_eq!(parse_salary("600-400"), Some(range(400.0, 600.0)));
    }

    #[test]
    fn rejects_unparseable_text() {
        assert_eq!(parse_salary(""), None);
        assert_eq!(parse_salary("negotiable"), None);
        assert_eq!(parse_salary("abc-500"), None);
    }

    #[test]
    fn bounds_fill_open_ends() {
        assert_eq!(SalaryRange::from_bounds(Some(500.0), None), Some(range(500.0, 1000.0)));
        assert_eq!(SalaryRange::from_bounds(None, Some(800.0)), Some(range(0.0, 800.0)));
        assert_eq!(SalaryRange::from_bounds(Some(0.0), Some(0.0)), None);
    }

    #[test]
    fn containment_scores_full() {
        assert_eq!(compare_ranges(&range(300.0, 500.0), &range(320.0, 480.0)), 100);
    }

    #[test]
    fn partial_overlap_uses_overlap_over_union() {
        // overlap 100, union 300
        assert_eq!(compare_ranges(&range(300.0, 500.0), &range(400.0, 600.0)), 33);
    }

    #[test]
    fn near_miss_scores_between_70_and_80() {
        let worker = range(300.0, 500.0);
        assert_eq!(compare_ranges(&worker, &range(500.0, 700.0)), 80);
        let score = compare_ranges(&worker, &range(550.0, 700.0));
        assert!((70..=80).contains(&score), "got {}", score);
        assert_eq!(compare_ranges(&worker, &range(600.0, 700.0)), 70);
    }

    #[test]
    fn single_figure_expectation() {
        let worker = range(500.0, 500.0);
        assert_eq!(compare_ranges(&worker, &range(400.0, 600.0)), 100);
        assert_eq!(compare_ranges(&worker, &range(500.0, 1000.0)), 100);
        assert_eq!(compare_ranges(&worker, &range(500.0, 500.0)), 100);
        // just outside stays in the near-miss band
        assert_eq!(compare_ranges(&worker, &range(550.0, 1000.0)), 75);
        assert_eq!(compare_ranges(&worker, &range(100.0, 200.0)), 30);
    }

    #[test]
    fn far_apart_scores_low() {
        let worker = range(300.0, 500.0);
        assert_eq!(compare_ranges(&worker, &range(1600.0, 2400.0)), 40);
        assert_eq!(compare_ranges(&range(15000.0, 20000.0), &range(1000.0, 2000.0)), 30);
    }

    #[test]
    fn unknown_side_is_neutral() {
        let expectation = SalaryExpectation {
            min: Some(300.0),
            max: Some(500.0),
            unit: SalaryUnit::Daily,
        };
        let unparseable = JobSalary::Text("negotiable".to_string());

        assert_eq!(score_salary(None, None, None), NEUTRAL_SALARY_SCORE);
        assert_eq!(score_salary(Some(&expectation), None, None), NEUTRAL_SALARY_SCORE);
        assert_eq!(
            score_salary(Some(&expectation), Some(&unparseable), None),
            NEUTRAL_SALARY_SCORE
        );
    }

    #[test]
    fn converts_units_when_both_known() {
        let expectation = SalaryExpectation {
            min: Some(10000.0),
            max: Some(14000.0),
            unit: SalaryUnit::Monthly,
        };
        // 450/day * 26 = 11,700/month
        let daily = JobSalary::Range {
            min: Some(450.0),
            max: Some(450.0),
        };

        assert_eq!(
            score_salary(Some(&expectation), Some(&daily), Some(SalaryUnit::Daily)),
            100
        );
        assert!(score_salary(Some(&expectation), Some(&daily), None) <= 40);
    }

    #[test]
    fn reads_unit_from_salary_text() {
        assert_eq!(
            parse_salary_with_unit("PHP 400/day"),
            Some((range(320.0, 480.0), Some(SalaryUnit::Daily)))
        );
        assert_eq!(
            parse_salary_with_unit("15k per month"),
            Some((range(12000.0, 18000.0), Some(SalaryUnit::Monthly)))
        );
        assert_eq!(
            parse_salary_with_unit("80-100 hourly"),
            Some((range(80.0, 100.0), Some(SalaryUnit::Hourly)))
        );
        assert_eq!(parse_salary_with_unit("300-500"), Some((range(300.0, 500.0), None)));
    }

    #[test]
    fn text_unit_converts_when_field_is_missing() {
        let expectation = SalaryExpectation {
            min: Some(12000.0),
            max: Some(15000.0),
            unit: SalaryUnit::Monthly,
        };
        // 500-550/day is 13,000-14,300 a month
        let daily = JobSalary::Text("₱500-550/day".to_string());
        assert_eq!(score_salary(Some(&expectation), Some(&daily), None), 100);

        // a bare figure spans 400-600/day: overlap 3,000 over union 5,200
        let bare = JobSalary::Text("₱500/day".to_string());
        assert_eq!(score_salary(Some(&expectation), Some(&bare), None), 58);

        // the explicit field wins over the text
        let monthly = JobSalary::Text("13,000-14,000/day".to_string());
        assert_eq!(
            score_salary(Some(&expectation), Some(&monthly), Some(SalaryUnit::Monthly)),
            100
        );
    }
}
