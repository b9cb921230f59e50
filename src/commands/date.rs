use anyhow::{anyhow, Result};

use onem2m_notebook::dates::get_date;

pub fn execute(delta: i64) -> Result<()> {
    let date = get_date(delta).ok_or_else(|| anyhow!("A delta of {} seconds is out of range", delta))?;
    println!("{}", date);
    Ok(())
}
