pub mod shared {
    pub mod bbox;
    pub mod constants;
    pub mod frame;
    pub mod model_resolver;
    pub mod video_metadata;
}

pub mod detection {
    pub mod domain {
        pub mod detection;
        pub mod fish_part;
        pub mod part_detector;
    }
    pub mod infrastructure;
}

pub mod reporting {
    pub mod domain {
        pub mod frame_result;
        pub mod position_reporter;
        pub mod welfare_monitor;
    }
}

pub mod visualization {
    pub mod domain {
        pub mod frame_annotator;
    }
    pub mod infrastructure;
}

pub mod video {
    pub mod domain {
        pub mod image_writer;
        pub mod video_reader;
    }
    pub mod infrastructure;
}

pub mod dataset {
    pub mod coco_dataset;
}

pub mod training {
    pub mod training_config;
}

pub mod pipeline {
    pub mod monitor_fish_use_case;
    pub mod pipeline_logger;
    pub mod preview_dataset_use_case;
}
