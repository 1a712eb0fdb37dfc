pub mod lemmatizer;
pub mod nmf;
pub mod tfidf;
pub mod tokenizer;
