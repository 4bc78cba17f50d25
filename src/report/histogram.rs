//! Terminal histogram of the two Sharpe distributions with benchmark markers.

pub const DEFAULT_BINS: usize = 40;

#[derive(Debug, Clone)]
pub struct Histogram {
    /// `bins + 1` ascending bin edges shared by both series.
    pub edges: Vec<f64>,
    pub ew_density: Vec<f64>,
    pub cw_density: Vec<f64>,
}

impl Histogram {
    /// Bin both series on a common grid spanning their union range.
    /// Non-finite values are ignored; `None` when nothing finite remains.
    pub fn build(ew: &[f64], cw: &[f64], bins: usize) -> Option<Self> {
        let bins = bins.max(1);
        let finite = |v: &[f64]| v.iter().copied().filter(|x| x.is_finite()).collect::<Vec<_>>();
        let ew = finite(ew);
        let cw = finite(cw);

        let all = ew.iter().chain(cw.iter());
        let lo = all.clone().copied().fold(f64::INFINITY, f64::min);
        let hi = all.copied().fold(f64::NEG_INFINITY, f64::max);
        if !lo.is_finite() || !hi.is_finite() {
            return None;
        }
        let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };

        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();

        Some(Self {
            edges,
            ew_density: density(&ew, lo, width, bins),
            cw_density: density(&cw, lo, width, bins),
        })
    }

    pub fn bins(&self) -> usize {
        self.edges.len() - 1
    }

    fn bin_of(&self, x: f64) -> Option<usize> {
        let lo = self.edges[0];
        let hi = self.edges[self.bins()];
        if !(lo..=hi).contains(&x) {
            return None;
        }
        let width = (hi - lo) / self.bins() as f64;
        Some((((x - lo) / width) as usize).min(self.bins() - 1))
    }

    /// One text row per bin: `#` for equal weight, `=` for cap weight.
    pub fn render(&self, markers: &[(String, f64)], bar_width: usize) -> String {
        let peak = self
            .ew_density
            .iter()
            .chain(&self.cw_density)
            .copied()
            .fold(0.0, f64::max);
        let scale = |d: f64| {
            if peak > 0.0 {
                ((d / peak) * bar_width as f64).round() as usize
            } else {
                0
            }
        };

        let mut out = String::new();
        out.push_str(&format!(
            "{:>8}  {:<w$}  {:<w$}\n",
            "Sharpe",
            "Dartboard (EW) #",
            "Index Proxy (CW) =",
            w = bar_width
        ));

        for i in 0..self.bins() {
            let ew_bar = "#".repeat(scale(self.ew_density[i]));
            let cw_bar = "=".repeat(scale(self.cw_density[i]));
            let mut line = format!("{:>8.2}  {:<w$}  {:<w$}", self.edges[i], ew_bar, cw_bar, w = bar_width);
            for (name, value) in markers {
                if value.is_finite() && self.bin_of(*value) == Some(i) {
                    line.push_str(&format!("  <- {name}: {value:.2}"));
                }
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }

        for (name, value) in markers {
            if !value.is_finite() || self.bin_of(*value).is_none() {
                out.push_str(&format!("          (off chart) {name}: {value:.2}\n"));
            }
        }
        out
    }
}

/// Histogram density: count / (n × bin width), so each series integrates to 1.
fn density(values: &[f64], lo: f64, width: f64, bins: usize) -> Vec<f64> {
    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    let n = values.len() as f64;
    counts
        .into_iter()
        .map(|c| if n > 0.0 { c as f64 / (n * width) } else { 0.0 })
        .collect()
}
