//! Linear softmax policy shared by the learning agents.

use crate::CartPoleAction;

pub(crate) const N_ACTIONS: usize = CartPoleAction::ALL.len();

/// State vector with a constant bias feature appended.
pub(crate) fn features(states: &[f32]) -> Vec<f32> {
    let mut x = Vec::with_capacity(states.len() + 1);
    x.extend_from_slice(states);
    x.push(1.0);
    x
}

pub(crate) fn dot(w: &[f32], x: &[f32]) -> f32 {
    w.iter().zip(x).map(|(a, b)| a * b).sum()
}

pub(crate) struct LinearSoftmax {
    /// One weight row per action, each of length `state_dim + 1`.
    weights: Vec<Vec<f32>>,
}

impl LinearSoftmax {
    pub(crate) fn zeros(state_dim: usize) -> Self {
        Self {
            weights: vec![vec![0.0; state_dim + 1]; N_ACTIONS],
        }
    }

    pub(crate) fn probabilities(&self, x: &[f32]) -> Vec<f32> {
        let logits: Vec<f32> = self.weights.iter().map(|w| dot(w, x)).collect();
        let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
        let sum: f32 = exps.iter().sum();
        exps.into_iter().map(|e| e / sum).collect()
    }

    pub(crate) fn sample(&self, x: &[f32], rng: &fastrand::Rng) -> usize {
        let probs = self.probabilities(x);
        let u = rng.f32();
        let mut cumulative = 0.0;
        for (index, p) in probs.iter().enumerate() {
            cumulative += p;
            if u < cumulative {
                return index;
            }
        }
        probs.len() - 1
    }

    /// Index of the most probable action; ties go to the lower index.
    pub(crate) fn greedy(&self, x: &[f32]) -> usize {
        let probs = self.probabilities(x);
        let mut best = 0;
        for (index, p) in probs.iter().enumerate() {
            if *p > probs[best] {
                best = index;
            }
        }
        best
    }

    /// Ascend `scale * grad log pi(action | x)`.
    pub(crate) fn ascend(&mut self, x: &[f32], action: usize, scale: f32) {
        let probs = self.probabilities(x);
        for (a, row) in self.weights.iter_mut().enumerate() {
            let indicator = if a == action { 1.0 } else { 0.0 };
            let coeff = scale * (indicator - probs[a]);
            for (w, xi) in row.iter_mut().zip(x) {
                *w += coeff * xi;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_weights_give_uniform_probabilities() {
        let policy = LinearSoftmax::zeros(4);
        let probs = policy.probabilities(&features(&[0.1, -0.2, 0.3, 0.0]));
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!((probs[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn ascent_makes_action_more_likely() {
        let mut policy = LinearSoftmax::zeros(2);
        let x = features(&[1.0, 0.5]);
        policy.ascend(&x, 1, 1.0);
        assert!(policy.probabilities(&x)[1] > 0.5);
        assert_eq!(policy.greedy(&x), 1);
    }
}
