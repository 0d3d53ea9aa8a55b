use crate::scheduler::SchedError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Bloc de deux semaines du calendrier académique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "blockNumber")]
    pub number: u8,
    #[serde(rename = "startDate")]
    pub start: NaiveDate,
    #[serde(rename = "endDate")]
    pub end: NaiveDate,
}

impl Block {
    /// Samedi du week-end `weekend` (1 ou 2) : premier samedi à partir du début du bloc,
    /// puis +7 jours.
    pub fn weekend_saturday(&self, weekend: u8) -> NaiveDate {
        let first = first_saturday_on_or_after(self.start);
        first + Duration::days(7 * i64::from(weekend.saturating_sub(1)))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn index(&self) -> usize {
        usize::from(self.number).saturating_sub(1)
    }
}

fn first_saturday_on_or_after(date: NaiveDate) -> NaiveDate {
    let target = Weekday::Sat.num_days_from_monday();
    let current = date.weekday().num_days_from_monday();
    let offset = (target + 7 - current) % 7;
    date + Duration::days(i64::from(offset))
}

/// Calendrier : blocs ordonnés, numérotés à partir de 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockCalendar {
    blocks: Vec<Block>,
}

impl BlockCalendar {
    pub fn new(blocks: Vec<Block>) -> Result<Self, SchedError> {
        let calendar = Self { blocks };
        calendar.validate()?;
        Ok(calendar)
    }

    /// Année académique standard : `count` blocs consécutifs de 14 jours.
    pub fn academic_year(start: NaiveDate, count: usize) -> Self {
        let blocks = (0..count)
            .map(|idx| {
                let offset = i64::try_from(idx).unwrap_or(0) * 14;
                let block_start = start + Duration::days(offset);
                Block {
                    number: u8::try_from(idx + 1).unwrap_or(u8::MAX),
                    start: block_start,
                    end: block_start + Duration::days(13),
                }
            })
            .collect();
        Self { blocks }
    }

    pub fn validate(&self) -> Result<(), SchedError> {
        for (idx, block) in self.blocks.iter().enumerate() {
            if usize::from(block.number) != idx + 1 {
                return Err(SchedError::MalformedCalendar(format!(
                    "block at position {} is numbered {}",
                    idx + 1,
                    block.number
                )));
            }
            if block.end < block.start {
                return Err(SchedError::MalformedCalendar(format!(
                    "block {} ends before it starts",
                    block.number
                )));
            }
            if idx > 0 && block.start <= self.blocks[idx - 1].end {
                return Err(SchedError::MalformedCalendar(format!(
                    "block {} overlaps block {}",
                    block.number,
                    idx
                )));
            }
        }
        Ok(())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Bloc par index 0-based.
    pub fn get(&self, idx: usize) -> Option<&Block> {
        self.blocks.get(idx)
    }

    pub fn by_number(&self, number: u8) -> Option<&Block> {
        self.blocks.iter().find(|b| b.number == number)
    }

    pub fn block_of(&self, date: NaiveDate) -> Option<&Block> {
        self.blocks.iter().find(|b| b.contains(date))
    }
}
