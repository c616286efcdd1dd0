use chord_core::selection::EntityOption;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Entity options matching `query`, best match first.
///
/// An empty query keeps the dropdown order ("all" first, then by name).
pub fn rank_entities<'a>(options: &'a [EntityOption], query: &str) -> Vec<&'a EntityOption> {
    let query = query.trim();
    if query.is_empty() {
        return options.iter().collect();
    }

    let matcher = SkimMatcherV2::default().ignore_case();
    let mut scored: Vec<(i64, &EntityOption)> = options
        .iter()
        .filter_map(|option| {
            matcher
                .fuzzy_match(&option.label, query)
                .map(|score| (score, option))
        })
        .collect();

    scored.sort_by(|(a_score, a), (b_score, b)| {
        b_score.cmp(a_score).then_with(|| a.label.cmp(&b.label))
    });
    scored.into_iter().map(|(_, option)| option).collect()
}

/// The `/` prompt: typed query plus the highlighted match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySearch {
    pub query: String,
    pub selected: usize,
}

impl EntitySearch {
    pub fn push(&mut self, c: char) {
        self.query.push(c);
        self.selected = 0;
    }

    pub fn pop(&mut self) {
        self.query.pop();
        self.selected = 0;
    }

    pub fn move_selection(&mut self, forward: bool, matches: usize) {
        if matches == 0 {
            self.selected = 0;
        } else if forward {
            self.selected = (self.selected + 1) % matches;
        } else {
            self.selected = (self.selected + matches - 1) % matches;
        }
    }

    /// The highlighted option among `options`, if anything matches.
    pub fn chosen<'a>(&self, options: &'a [EntityOption]) -> Option<&'a EntityOption> {
        let matches = rank_entities(options, &self.query);
        matches.get(self.selected).or_else(|| matches.first()).copied()
    }
}
