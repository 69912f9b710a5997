/// Receives the outcome of each product crossing a beam.
pub trait ScoreListener {
    fn product_result(&mut self, correct: bool);

    fn level_end(&mut self);
}

/// Listener that just records what it was told.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreLog {
    pub results: Vec<bool>,
    pub level_ends: usize,
}

impl ScoreLog {
    pub fn correct(&self) -> usize {
        self.results.iter().filter(|correct| **correct).count()
    }

    pub fn incorrect(&self) -> usize {
        self.results.len() - self.correct()
    }

    pub fn level_ended(&self) -> bool {
        self.level_ends > 0
    }
}

impl ScoreListener for ScoreLog {
    fn product_result(&mut self, correct: bool) {
        tracing::info!("product scored: {}", if correct { "good" } else { "bad" });
        self.results.push(correct);
    }

    fn level_end(&mut self) {
        tracing::info!("level end");
        self.level_ends += 1;
    }
}

impl<L: ScoreListener + ?Sized> ScoreListener for &mut L {
    fn product_result(&mut self, correct: bool) {
        (**self).product_result(correct);
    }

    fn level_end(&mut self) {
        (**self).level_end();
    }
}
