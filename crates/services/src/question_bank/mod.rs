mod catalog;

use rand::{Rng, rng};

use quiz_core::model::{CategoryInfo, Difficulty, Question, QuestionId, QuestionSet};

pub use catalog::QuestionCatalog;

/// Draws per-session question samples from an immutable question set.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    categories: Vec<CategoryInfo>,
    set: QuestionSet,
}

impl QuestionBank {
    #[must_use]
    pub fn new(set: QuestionSet) -> Self {
        Self {
            categories: Vec::new(),
            set,
        }
    }

    #[must_use]
    pub fn from_catalog(catalog: QuestionCatalog) -> Self {
        let (categories, set) = catalog.into_parts();
        Self { categories, set }
    }

    /// Category menu, in catalog order.
    #[must_use]
    pub fn categories(&self) -> &[CategoryInfo] {
        &self.categories
    }

    #[must_use]
    pub fn question_set(&self) -> &QuestionSet {
        &self.set
    }

    /// Key whose templates a request for `category` is served from.
    #[must_use]
    pub fn resolve_category<'a>(&'a self, category: &'a str) -> &'a str {
        self.set.resolve_key(category)
    }

    /// Session length for a raw difficulty string; unknown values count as easy.
    #[must_use]
    pub fn count_for(difficulty: &str) -> usize {
        Difficulty::parse_or_default(difficulty).question_count()
    }

    /// Sample `count` questions for `category` using the thread-local RNG.
    #[must_use]
    pub fn select_questions(&self, category: &str, count: usize) -> Vec<Question> {
        self.select_questions_with(category, count, &mut rng())
    }

    /// Sample without replacement: each draw takes a uniformly random
    /// remaining template, so no template repeats within the result. When the
    /// category holds fewer than `count` templates, all of them are returned.
    ///
    /// Ids are assigned 1-based in draw order. Unknown categories draw from
    /// the default category.
    pub fn select_questions_with<R: Rng + ?Sized>(
        &self,
        category: &str,
        count: usize,
        rng: &mut R,
    ) -> Vec<Question> {
        let mut pool: Vec<_> = self.set.resolve(category).iter().collect();
        let take = count.min(pool.len());
        let mut selected = Vec::with_capacity(take);

        for position in 1..=take {
            let index = rng.random_range(0..pool.len());
            let template = pool.swap_remove(index);
            let id = QuestionId::new(u32::try_from(position).unwrap_or(u32::MAX));
            selected.push(template.assign_id(id));
        }

        selected
    }
}
