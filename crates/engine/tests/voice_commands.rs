use std::{str::FromStr, sync::Arc, thread};

use rust_decimal::Decimal;
use voice_engine::{
    Category, CurrencyCode, CurrencyRegistry, ExpenseCommand, ParseError, Settings,
    VoiceCommandProcessor,
};

fn processor() -> VoiceCommandProcessor {
    VoiceCommandProcessor::builder().build().unwrap()
}

fn code(value: &str) -> CurrencyCode {
    CurrencyCode::try_from(value).unwrap()
}

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

fn parse(command: &str, default: Option<&str>) -> Result<ExpenseCommand, ParseError> {
    let default = default.map(code);
    processor().process_voice_command(command, None, default.as_ref())
}

#[test]
fn spelled_amount_with_currency_keyword() {
    let expense = parse("I just spent two thousand dirhams on groceries", None).unwrap();
    assert_eq!(expense.amount, dec("2000.00"));
    assert_eq!(expense.amount.to_string(), "2000.00");
    assert_eq!(expense.currency_code, "AED");
    assert_eq!(expense.category, Category::Groceries);
    assert_eq!(expense.merchant, None);
    assert_eq!(
        expense.raw_transcript,
        "I just spent two thousand dirhams on groceries"
    );
}

#[test]
fn symbol_beats_default_currency() {
    let expense = parse("I spent ₹20 for tea", Some("AED")).unwrap();
    assert_eq!(expense.amount, dec("20.00"));
    assert_eq!(expense.currency_code, "INR");
    assert_eq!(expense.category, Category::Food);
}

#[test]
fn default_currency_when_none_spoken() {
    let expense = parse("I spent 50 on groceries", Some("AED")).unwrap();
    assert_eq!(expense.amount, dec("50.00"));
    assert_eq!(expense.currency_code, "AED");
    assert_eq!(expense.category, Category::Groceries);
}

#[test]
fn merchant_after_at() {
    let expense = parse("paid 100 dollars at Amazon", None).unwrap();
    assert_eq!(expense.amount, dec("100.00"));
    assert_eq!(expense.currency_code, "USD");
    assert_eq!(expense.merchant.as_deref(), Some("Amazon"));
    assert_eq!(expense.category, Category::Shopping);
}

#[test]
fn empty_transcript_fails() {
    let err = parse("", Some("AED")).unwrap_err();
    assert_eq!(err, ParseError::EmptyInput);
    assert_eq!(err.code(), "empty_input");
    assert_eq!(parse("   ", None), Err(ParseError::EmptyInput));
}

#[test]
fn decimal_amount_with_keyword() {
    let expense = parse("I spent 99.99 dollars", None).unwrap();
    assert_eq!(expense.amount, dec("99.99"));
    assert_eq!(expense.currency_code, "USD");
}

#[test]
fn full_sentence() {
    let expense = parse(
        "I just spent two thousand five hundred dirhams on groceries at Carrefour",
        None,
    )
    .unwrap();
    assert_eq!(expense.amount, dec("2500"));
    assert_eq!(expense.currency_code, "AED");
    assert_eq!(expense.category, Category::Groceries);
    assert_eq!(expense.merchant.as_deref(), Some("Carrefour"));
}

#[test]
fn indian_scale_words() {
    let expense = parse("paid one lakh fifty thousand rupees for the car service", None).unwrap();
    assert_eq!(expense.amount, dec("150000"));
    assert_eq!(expense.currency_code, "INR");
}

#[test]
fn specific_keyword_wins_over_generic() {
    let expense = parse("twenty swiss francs for coffee", None).unwrap();
    assert_eq!(expense.currency_code, "CHF");
    let expense = parse("forty canadian dollars at Tim Hortons", None).unwrap();
    assert_eq!(expense.currency_code, "CAD");
    assert_eq!(expense.merchant.as_deref(), Some("Tim Hortons"));
}

#[test]
fn iso_code_and_glued_symbol() {
    let expense = parse("Taxi 35 AED", None).unwrap();
    assert_eq!(expense.amount, dec("35"));
    assert_eq!(expense.currency_code, "AED");
    assert_eq!(expense.category, Category::Transport);

    let expense = parse("€12.50 at the bakery", None).unwrap();
    assert_eq!(expense.amount, dec("12.50"));
    assert_eq!(expense.currency_code, "EUR");
    assert_eq!(expense.category, Category::Food);
}

#[test]
fn amount_and_currency_come_from_the_same_mention() {
    let expense = parse("paid 30 euros for 2 pounds of coffee", None).unwrap();
    assert_eq!(expense.amount, dec("30.00"));
    assert_eq!(expense.currency_code, "EUR");

    let expense = parse("paid 20 euros plus a 5 dollar tip", None).unwrap();
    assert_eq!(expense.amount, dec("20.00"));
    assert_eq!(expense.currency_code, "EUR");
}

#[test]
fn numerals_joined_by_and_stay_separate() {
    let expense = parse("I paid 50 and 20 dirhams", None).unwrap();
    assert_eq!(expense.amount, dec("20.00"));
    assert_eq!(expense.currency_code, "AED");
}

#[test]
fn spoken_point_keeps_written_fraction() {
    let expense = parse("two point 05 dollars", None).unwrap();
    assert_eq!(expense.amount, dec("2.05"));
    assert_eq!(expense.currency_code, "USD");
}

#[test]
fn words_that_spell_codes_keep_the_default() {
    let expense = parse("I spent 40 on a back rub", Some("AED")).unwrap();
    assert_eq!(expense.amount, dec("40.00"));
    assert_eq!(expense.currency_code, "AED");

    let expense = parse("donated 25 to NPR", Some("USD")).unwrap();
    assert_eq!(expense.currency_code, "USD");
}

#[test]
fn trailing_period_after_a_symbol() {
    assert_eq!(parse("it cost 20 kr.", None).unwrap().currency_code, "SEK");
    assert_eq!(parse("it cost 20 kr", None).unwrap().currency_code, "SEK");
}

#[test]
fn failures_are_typed() {
    assert_eq!(
        parse("bought groceries at Lulu", Some("AED")),
        Err(ParseError::MissingAmount)
    );
    assert_eq!(
        parse("spent five three dirhams", None),
        Err(ParseError::AmbiguousNumberPhrase)
    );
    assert_eq!(
        parse("spent 50 on lunch", None),
        Err(ParseError::UnresolvedCurrency)
    );

    let err = parse("a trillion dollars for a yacht", None).unwrap_err();
    assert_eq!(err.code(), "amount_out_of_range");
    assert_eq!(
        err,
        ParseError::AmountOutOfRange {
            amount: dec("1000000000000"),
            max: dec("999999999999.99"),
        }
    );
}

#[test]
fn upper_bound_is_inclusive() {
    let expense = parse("999,999,999,999.99 dollars", None).unwrap();
    assert_eq!(expense.amount, dec("999999999999.99"));
    assert!(matches!(
        parse("1,000,000,000,000 dollars", None),
        Err(ParseError::AmountOutOfRange { .. })
    ));
}

#[test]
fn unknown_words_fall_back_to_other() {
    let expense = parse("10 dollars for something", None).unwrap();
    assert_eq!(expense.category, Category::Other);
}

#[test]
fn locale_fallback_from_settings() {
    let settings = Settings {
        infer_currency_from_locale: true,
        ..Settings::default()
    };
    let processor = VoiceCommandProcessor::from_settings(&settings).unwrap();
    let expense = processor
        .process_voice_command("spent 30 on lunch", Some("ar-AE"), None)
        .unwrap();
    assert_eq!(expense.currency_code, "AED");
    assert_eq!(
        processor.process_voice_command("spent 30 on lunch", Some("xx-ZZ"), None),
        Err(ParseError::UnresolvedCurrency)
    );
}

#[test]
fn settings_file_and_currency_table_from_disk() {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let table = root.join("data/currencies.json");
    let settings = Settings::from_toml_str(&format!(
        r#"
        currencies_path = "{}"
        default_currency = "GBP"
        max_amount = "1000"

        [category_aliases]
        "dog walker" = "Other"
        "#,
        table.display()
    ))
    .unwrap();
    let processor = VoiceCommandProcessor::from_settings(&settings).unwrap();
    assert_eq!(processor.registry().len(), CurrencyRegistry::builtin().unwrap().len());

    let expense = processor
        .process_voice_command("25 for the dog walker", None, None)
        .unwrap();
    assert_eq!(expense.currency_code, "GBP");
    assert_eq!(expense.category, Category::Other);
    assert!(matches!(
        processor.process_voice_command("2000 for the dog walker", None, None),
        Err(ParseError::AmountOutOfRange { .. })
    ));
}

#[test]
fn shared_registry_across_threads() {
    let registry = Arc::new(CurrencyRegistry::builtin().unwrap());
    let processor = Arc::new(
        VoiceCommandProcessor::builder()
            .registry(Arc::clone(&registry))
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = ["five dollars", "five euros", "five pounds", "five rupees"]
        .into_iter()
        .map(|command| {
            let processor = Arc::clone(&processor);
            thread::spawn(move || {
                processor
                    .process_voice_command(command, None, None)
                    .map(|expense| expense.currency_code.to_string())
            })
        })
        .collect();

    let codes: Vec<String> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap().unwrap())
        .collect();
    assert_eq!(codes, vec!["USD", "EUR", "GBP", "INR"]);
}
