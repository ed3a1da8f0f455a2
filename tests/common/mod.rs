#![allow(dead_code)]

use std::io::Write;
use tipdash::domain::error::TipdashError;
pub use tipdash::domain::record::{Day, Record, Sex, Smoker, Time};
use tipdash::ports::record_port::RecordPort;

/// Twenty-two rows taken from the public tips dataset, covering every day.
pub const TIPS_CSV: &str = "total_bill,tip,sex,smoker,day,time,size
16.99,1.01,Female,No,Sun,Dinner,2
10.34,1.66,Male,No,Sun,Dinner,3
21.01,3.5,Male,No,Sun,Dinner,3
23.68,3.31,Male,No,Sun,Dinner,2
24.59,3.61,Female,No,Sun,Dinner,4
25.29,4.71,Male,No,Sun,Dinner,4
8.77,2.0,Male,No,Sun,Dinner,2
26.88,3.12,Male,No,Sun,Dinner,4
15.04,1.96,Male,No,Sun,Dinner,2
14.78,3.23,Male,No,Sun,Dinner,2
27.2,4.0,Male,No,Thur,Lunch,4
22.76,3.0,Male,No,Thur,Lunch,2
17.29,2.71,Male,No,Thur,Lunch,2
19.44,3.0,Male,Yes,Thur,Lunch,2
28.97,3.0,Male,Yes,Fri,Dinner,2
22.49,3.5,Male,No,Fri,Dinner,2
5.75,1.0,Female,Yes,Fri,Dinner,2
20.65,3.35,Male,No,Sat,Dinner,3
17.92,4.08,Male,No,Sat,Dinner,2
20.29,2.75,Female,No,Sat,Dinner,2
50.81,10.0,Male,Yes,Sat,Dinner,3
3.07,1.0,Female,Yes,Sat,Dinner,1
";

pub fn make_record(
    total_bill: f64,
    tip: f64,
    sex: Sex,
    smoker: Smoker,
    day: Day,
    time: Time,
    size: u32,
) -> Record {
    Record {
        total_bill,
        tip,
        sex,
        smoker,
        day,
        time,
        size,
    }
}

/// The two-row Saturday dinner sample used throughout the docs.
pub fn saturday_pair() -> Vec<Record> {
    vec![
        make_record(10.0, 2.0, Sex::Male, Smoker::No, Day::Sat, Time::Dinner, 2),
        make_record(20.0, 5.0, Sex::Female, Smoker::No, Day::Sat, Time::Dinner, 3),
    ]
}

pub fn write_temp_file(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub struct MockRecordPort {
    pub records: Vec<Record>,
    pub error: Option<String>,
}

impl MockRecordPort {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            records: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl RecordPort for MockRecordPort {
    fn load_records(&self) -> Result<Vec<Record>, TipdashError> {
        match &self.error {
            Some(reason) => Err(TipdashError::DataLoad {
                reason: reason.clone(),
            }),
            None => Ok(self.records.clone()),
        }
    }
}
