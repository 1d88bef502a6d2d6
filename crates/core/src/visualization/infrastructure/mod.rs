pub mod box_annotator;
